//! Parameter file loading
//!
//! A parameter file maps installer component names to the configuration
//! rendered into that installer's templates:
//!
//! ```toml
//! [python]
//! package = "demo"
//!
//! [python.meta]
//! run_install_scripts = false
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::constants::{DEFAULT_SOURCE_ROOT, PARAMS_META_KEY};
use crate::error::{Error, Result};
use crate::merge::{ConflictStrategy, MergeStrategy};

/// Options an installer reads from the reserved `meta` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InstallerMeta {
    #[serde(default = "get_default_run_install_scripts")]
    pub run_install_scripts: bool,
    #[serde(default = "get_default_source_root")]
    pub source_root: String,
    /// Falls back to the command line setting when absent.
    #[serde(default)]
    pub conflict_strategy: Option<ConflictStrategy>,
    /// Falls back to the command line setting when absent.
    #[serde(default)]
    pub merge_strategy: Option<MergeStrategy>,
}

impl Default for InstallerMeta {
    fn default() -> Self {
        Self {
            run_install_scripts: get_default_run_install_scripts(),
            source_root: get_default_source_root(),
            conflict_strategy: None,
            merge_strategy: None,
        }
    }
}

fn get_default_run_install_scripts() -> bool {
    true
}

fn get_default_source_root() -> String {
    DEFAULT_SOURCE_ROOT.to_string()
}

/// Parameter file syntax, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamsFormat {
    Toml,
    Yaml,
    Json,
}

impl ParamsFormat {
    /// `.yaml`/`.yml` and `.json` select their format; anything else is TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => ParamsFormat::Yaml,
            Some("json") => ParamsFormat::Json,
            _ => ParamsFormat::Toml,
        }
    }
}

/// Per-installer parameters, in file order.
#[derive(Debug, Clone)]
pub struct Params {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl Params {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| params_error(path, e))?;
        Self::parse(&content, ParamsFormat::from_path(path), path)
    }

    /// Parses `content`; `path` is only used to name the file in errors.
    pub fn parse(content: &str, format: ParamsFormat, path: &Path) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self { path: path.to_path_buf(), entries: Map::new() });
        }

        let value: Value = match format {
            ParamsFormat::Toml => toml::from_str(content).map_err(|e| params_error(path, e))?,
            ParamsFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| params_error(path, e))?
            }
            ParamsFormat::Json => {
                serde_json::from_str(content).map_err(|e| params_error(path, e))?
            }
        };

        let entries = match value {
            Value::Object(entries) => entries,
            Value::Null => Map::new(),
            other => {
                return Err(params_error(
                    path,
                    format!("top level must be a mapping of installer names, found {other}"),
                ))
            }
        };

        if let Some((name, _)) = entries.iter().find(|(_, entry)| !entry.is_object()) {
            return Err(params_error(path, format!("entry '{name}' must be a mapping")));
        }

        Ok(Self { path: path.to_path_buf(), entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Installer names in file order.
    pub fn installer_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// The configuration layer for `installer`, `meta` included.
    pub fn installer_config(&self, installer: &str) -> Result<&Value> {
        self.entries
            .get(installer)
            .ok_or_else(|| Error::ParametersNotFound { installer: installer.to_string() })
    }

    pub fn installer_meta(&self, installer: &str) -> Result<InstallerMeta> {
        match self.installer_config(installer)?.get(PARAMS_META_KEY) {
            None | Some(Value::Null) => Ok(InstallerMeta::default()),
            Some(meta) => InstallerMeta::deserialize(meta).map_err(|e| {
                params_error(&self.path, format!("invalid '{installer}.{PARAMS_META_KEY}': {e}"))
            }),
        }
    }
}

fn params_error<E: ToString>(path: &Path, err: E) -> Error {
    Error::ParamsFileError { path: path.display().to_string(), message: err.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const TOML_PARAMS: &str = r#"
[rust]
crate_name = "demo"

[python]
package = "demo"

[python.meta]
run_install_scripts = false
conflict_strategy = "FORCE"
"#;

    fn parse_toml(content: &str) -> Result<Params> {
        Params::parse(content, ParamsFormat::Toml, Path::new("params.toml"))
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(ParamsFormat::from_path(Path::new("p.yaml")), ParamsFormat::Yaml);
        assert_eq!(ParamsFormat::from_path(Path::new("p.yml")), ParamsFormat::Yaml);
        assert_eq!(ParamsFormat::from_path(Path::new("p.json")), ParamsFormat::Json);
        assert_eq!(ParamsFormat::from_path(Path::new("p.toml")), ParamsFormat::Toml);
        assert_eq!(ParamsFormat::from_path(Path::new("params")), ParamsFormat::Toml);
    }

    #[test]
    fn installer_names_keep_file_order() {
        let params = parse_toml(TOML_PARAMS).unwrap();
        assert_eq!(params.installer_names(), ["rust", "python"]);
    }

    #[test]
    fn meta_is_deserialized_with_defaults() {
        let params = parse_toml(TOML_PARAMS).unwrap();

        let python = params.installer_meta("python").unwrap();
        assert!(!python.run_install_scripts);
        assert_eq!(python.source_root, "root");
        assert_eq!(python.conflict_strategy, Some(ConflictStrategy::Force));

        assert_eq!(params.installer_meta("rust").unwrap(), InstallerMeta::default());
    }

    #[test]
    fn config_includes_meta() {
        let params = parse_toml(TOML_PARAMS).unwrap();
        let config = params.installer_config("python").unwrap();
        assert_eq!(config["package"], "demo");
        assert_eq!(config["meta"]["run_install_scripts"], false);
    }

    #[test]
    fn unknown_installer_is_reported() {
        let params = parse_toml(TOML_PARAMS).unwrap();
        let err = params.installer_config("go").unwrap_err();
        assert!(matches!(err, Error::ParametersNotFound { ref installer } if installer == "go"));
    }

    #[test]
    fn entries_must_be_mappings() {
        let err = parse_toml("python = 3\n").unwrap_err();
        assert!(matches!(err, Error::ParamsFileError { .. }));
    }

    #[test]
    fn invalid_meta_is_a_params_error() {
        let params = parse_toml("[python.meta]\nrun_install_scripts = \"sometimes\"\n").unwrap();
        let err = params.installer_meta("python").unwrap_err();
        assert!(matches!(err, Error::ParamsFileError { .. }));
    }

    #[test]
    fn loads_yaml_and_json_files() {
        let dir = TempDir::new().unwrap();
        let yaml = dir.path().join("params.yml");
        let json = dir.path().join("params.json");
        fs::write(&yaml, "python:\n  package: demo\n  meta:\n    source_root: tree\n").unwrap();
        fs::write(&json, r#"{"python": {"package": "demo"}}"#).unwrap();

        let from_yaml = Params::load(&yaml).unwrap();
        assert_eq!(from_yaml.installer_meta("python").unwrap().source_root, "tree");

        let from_json = Params::load(&json).unwrap();
        assert_eq!(from_json.installer_config("python").unwrap()["package"], "demo");
    }

    #[test]
    fn missing_file_is_a_params_error() {
        let dir = TempDir::new().unwrap();
        let err = Params::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, Error::ParamsFileError { .. }));
    }

    #[test]
    fn empty_yaml_has_no_installers() {
        let params = Params::parse("", ParamsFormat::Yaml, Path::new("p.yml")).unwrap();
        assert!(params.installer_names().is_empty());
    }
}
