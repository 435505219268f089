use crate::{
    cli::Args,
    config::Params,
    constants::targets::MAIN,
    error::{Error, Result},
    ext::PathExt,
    installer::{Installer, InstallerOptions},
    renderer::{get_template_engine, TemplateRenderer},
    rollback::{GitWorkTree, Transaction},
};
use std::path::{Path, PathBuf};

/// Drives every requested installer against the destination directory.
pub struct Runner {
    args: Args,
}

impl Runner {
    pub fn new(args: Args) -> Self {
        Self { args }
    }

    /// Loads the parameters file and runs the installers in order. The first
    /// failing installer stops the run.
    pub fn run(self) -> Result<()> {
        let params = Params::load(&self.args.params)?;
        let engine = get_template_engine();

        let installers = if self.args.installers.is_empty() {
            params.installer_names()
        } else {
            self.args.installers.clone()
        };

        for name in &installers {
            let installer = self.resolve_installer(&params, name)?;
            let config = params.installer_config(&installer.component_name())?;
            self.run_installer(&engine, &installer, config)?;
        }

        log::info!(
            target: MAIN,
            "Ran {} installer(s) into '{}'",
            installers.len(),
            self.args.dest_dir.display()
        );
        Ok(())
    }

    /// Builds the installer for `name`, a directory name below the installers
    /// directory (or a path when there is none). Parameters are looked up by
    /// the directory's base name.
    pub fn resolve_installer(&self, params: &Params, name: &str) -> Result<Installer> {
        let source_dir = match &self.args.installers_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        };
        let component = source_dir.base_name();
        let meta = params.installer_meta(&component)?;

        if !source_dir.is_dir() {
            return Err(Error::InstallerNotFound {
                installer: name.to_string(),
                source_dir: source_dir.display().to_string(),
            });
        }

        let options = InstallerOptions {
            source_root: meta.source_root,
            run_install_scripts: meta.run_install_scripts,
            conflict_strategy: meta.conflict_strategy.unwrap_or(self.args.conflict_strategy),
            merge_strategy: meta.merge_strategy.unwrap_or(self.args.merge_strategy),
            ..Default::default()
        };
        Ok(Installer::new(source_dir, options))
    }

    fn run_installer(
        &self,
        engine: &dyn TemplateRenderer,
        installer: &Installer,
        config: &serde_json::Value,
    ) -> Result<()> {
        let dest_dir: &Path = &self.args.dest_dir;
        if self.args.no_rollback {
            return installer.install_with(engine, config, dest_dir);
        }

        let component = installer.component_name();
        Transaction::new(GitWorkTree::new(dest_dir, &component), &component)
            .run(|| installer.install_with(engine, config, dest_dir))
    }
}

pub fn run(args: Args) -> Result<()> {
    Runner::new(args).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParamsFormat;
    use crate::merge::{ConflictStrategy, MergeStrategy};
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn params(content: &str) -> Params {
        Params::parse(content, ParamsFormat::Toml, Path::new("params.toml")).unwrap()
    }

    fn runner(installers_dir: &Path) -> Runner {
        Runner::new(Args::parse_from([
            "bootstep",
            "-p",
            "params.toml",
            "-i",
            installers_dir.to_str().unwrap(),
        ]))
    }

    #[test]
    fn resolves_options_from_meta() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("python")).unwrap();
        let params = params(
            "[python.meta]\nrun_install_scripts = false\nsource_root = \"tree\"\n\
             merge_strategy = \"replace\"\n",
        );

        let installer = runner(dir.path()).resolve_installer(&params, "python").unwrap();

        assert_eq!(installer.source_dir(), dir.path().join("python"));
        let options = installer.options();
        assert!(!options.run_install_scripts);
        assert_eq!(options.source_root, "tree");
        assert_eq!(options.conflict_strategy, ConflictStrategy::Error);
        assert_eq!(options.merge_strategy, MergeStrategy::Replace);
    }

    #[test]
    fn missing_parameters_are_reported() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("python")).unwrap();

        let err = runner(dir.path()).resolve_installer(&params("[rust]\n"), "python").unwrap_err();
        assert!(matches!(err, Error::ParametersNotFound { ref installer } if installer == "python"));
    }

    #[test]
    fn missing_installer_directory_is_reported() {
        let dir = TempDir::new().unwrap();

        let err = runner(dir.path()).resolve_installer(&params("[python]\n"), "python").unwrap_err();
        assert!(matches!(err, Error::InstallerNotFound { ref installer, .. } if installer == "python"));
    }
}
