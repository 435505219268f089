//! A single installer: a directory holding a source tree plus optional
//! install scripts.
//!
//! ```text
//! installers/python/
//! ├── install.sh         # run before the file pass
//! ├── postinstall.py     # run after the file pass
//! └── root/              # rendered into the destination
//!     ├── pyproject.toml
//!     └── {{ package }}/__init__.py
//! ```
//!
//! Installing renders every path and file below the source root against the
//! parameters layered over the installer's own `__install__` metadata, and
//! hands existing destination files to the merge engine.

pub mod operation;
pub mod processor;
pub mod script;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use walkdir::WalkDir;

use crate::constants::{
    DEFAULT_INSTALL_SCRIPT, DEFAULT_POST_INSTALL_SCRIPT, DEFAULT_SOURCE_ROOT, INSTALL_META_KEY,
};
use crate::error::{Error, Result};
use crate::ext::PathExt;
use crate::merge::{ConflictStrategy, MergeStrategy};
use crate::renderer::{get_template_engine, Scope, TemplateRenderer};

pub use operation::FileOperation;
pub use processor::FileProcessor;
pub use script::{find_script, render_and_execute_script, ScriptRunner};

/// Per-installer settings. Fixed once the installer is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerOptions {
    /// Subdirectory of the installer holding the tree to render.
    pub source_root: String,
    /// Base name of the script run before the file pass.
    pub install_script: String,
    /// Base name of the script run after the file pass.
    pub post_install_script: String,
    pub run_install_scripts: bool,
    pub conflict_strategy: ConflictStrategy,
    pub merge_strategy: MergeStrategy,
}

impl Default for InstallerOptions {
    fn default() -> Self {
        Self {
            source_root: DEFAULT_SOURCE_ROOT.to_string(),
            install_script: DEFAULT_INSTALL_SCRIPT.to_string(),
            post_install_script: DEFAULT_POST_INSTALL_SCRIPT.to_string(),
            run_install_scripts: true,
            conflict_strategy: ConflictStrategy::default(),
            merge_strategy: MergeStrategy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Installer {
    source_dir: PathBuf,
    options: InstallerOptions,
}

impl Installer {
    pub fn new<P: Into<PathBuf>>(source_dir: P, options: InstallerOptions) -> Self {
        Self { source_dir: source_dir.into(), options }
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn options(&self) -> &InstallerOptions {
        &self.options
    }

    /// The installer's directory name; used as its log target.
    pub fn component_name(&self) -> String {
        let name = self.source_dir.base_name();
        if name.is_empty() {
            self.source_dir.display().to_string()
        } else {
            name
        }
    }

    pub fn source_root_dir(&self) -> PathBuf {
        self.source_dir.join(&self.options.source_root)
    }

    /// Scope layer describing this installer, exposed to templates under
    /// `__install__`.
    pub fn metadata(&self) -> serde_json::Value {
        let options = &self.options;
        json!({
            INSTALL_META_KEY: {
                "component_name": self.component_name(),
                "source_dir": self.source_dir.display().to_string(),
                "source_root": options.source_root,
                "source_root_dir": self.source_root_dir().display().to_string(),
                "install_script": options.install_script,
                "post_install_script": options.post_install_script,
                "run_install_scripts": options.run_install_scripts,
                "conflict_strategy": options.conflict_strategy.to_string(),
                "merge_strategy": options.merge_strategy.to_string(),
            }
        })
    }

    /// Runs the install script, the file pass and the post-install script,
    /// in that order, with `dest_dir` as working directory.
    ///
    /// The first failing stage aborts the install; later stages do not run.
    pub fn install(&self, config: &serde_json::Value, dest_dir: &Path) -> Result<()> {
        self.install_with(&get_template_engine(), config, dest_dir)
    }

    pub fn install_with(
        &self,
        engine: &dyn TemplateRenderer,
        config: &serde_json::Value,
        dest_dir: &Path,
    ) -> Result<()> {
        let component = self.component_name();
        let scope = Scope::new().with_layer(config).with_layer(&self.metadata());

        log::info!(
            target: component.as_str(),
            "Installing '{}' into '{}'",
            self.source_dir.display(),
            dest_dir.display()
        );

        self.run_script(engine, &scope, dest_dir, &self.options.install_script)?;
        self.install_files(engine, &scope, dest_dir)?;
        self.run_script(engine, &scope, dest_dir, &self.options.post_install_script)?;

        log::info!(target: component.as_str(), "Installed '{}'", component);
        Ok(())
    }

    fn run_script(
        &self,
        engine: &dyn TemplateRenderer,
        scope: &Scope,
        dest_dir: &Path,
        script_base: &str,
    ) -> Result<()> {
        let component = self.component_name();
        if !self.options.run_install_scripts {
            log::debug!(target: component.as_str(), "Scripts disabled; skipping '{script_base}'");
            return Ok(());
        }

        let Some(script) = find_script(&self.source_dir, script_base) else {
            log::info!(target: component.as_str(), "No '{script_base}' script found");
            return Ok(());
        };

        log::info!(target: component.as_str(), "Running '{}'", script.display());
        match render_and_execute_script(engine, &script, scope, dest_dir)? {
            Some(output) => {
                log::debug!(target: component.as_str(), "stdout: {}", output.stdout.trim_end());
                log::debug!(target: component.as_str(), "stderr: {}", output.stderr.trim_end());
            }
            None => {
                log::info!(target: component.as_str(), "'{}' rendered empty", script.display())
            }
        }
        Ok(())
    }

    fn install_files(
        &self,
        engine: &dyn TemplateRenderer,
        scope: &Scope,
        dest_dir: &Path,
    ) -> Result<()> {
        let component = self.component_name();
        let source_root = self.source_root_dir();
        if !source_root.is_dir() {
            log::info!(
                target: component.as_str(),
                "No source root at '{}'; nothing to copy",
                source_root.display()
            );
            return Ok(());
        }

        let processor = FileProcessor::new(
            engine,
            scope,
            &source_root,
            dest_dir,
            self.options.merge_strategy,
            self.options.conflict_strategy,
        );

        for entry in WalkDir::new(&source_root).sort_by_file_name() {
            let entry = entry?;
            if !entry.path().is_file() {
                continue;
            }
            let operation = processor.process(entry.path())?;
            log::info!(target: component.as_str(), "{}", operation.get_message());
        }
        Ok(())
    }
}

/// Renders `source` into `target`, trimmed and terminated by a single
/// newline. Returns the trimmed length; nothing is written when it is zero.
///
/// Content that is not valid UTF-8 is copied verbatim. `dest_file` only
/// names the final destination in a `TemplateKeyError`.
pub(crate) fn render_file(
    engine: &dyn TemplateRenderer,
    source: &Path,
    target: &Path,
    dest_file: &Path,
    scope: &Scope,
) -> Result<usize> {
    let content = match String::from_utf8(fs::read(source)?) {
        Ok(content) => content,
        Err(binary) => {
            let bytes = binary.into_bytes();
            fs::write(target, &bytes)?;
            return Ok(bytes.len());
        }
    };

    let template_name = source.display().to_string();
    let rendered = engine
        .render(&content, scope, Some(&template_name))
        .map_err(|e| key_error(e, source, dest_file))?;

    let rendered = rendered.trim();
    if rendered.is_empty() {
        return Ok(0);
    }
    fs::write(target, format!("{rendered}\n"))?;
    Ok(rendered.len())
}

pub(crate) fn key_error(err: Error, source: &Path, dest_file: &Path) -> Error {
    match err {
        Error::UndefinedKey { key, .. } => Error::TemplateKeyError {
            key,
            source_file: source.display().to_string(),
            dest_file: dest_file.display().to_string(),
        },
        other => other,
    }
}
