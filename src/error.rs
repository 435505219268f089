use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}.")]
    IoError(#[from] std::io::Error),

    #[error("Failed to walk directory. Original error: {0}")]
    WalkDirError(#[from] walkdir::Error),

    #[error("Failed to compile file pattern. Original error: {0}")]
    GlobSetParseError(#[from] globset::Error),

    #[error("Failed to render. Original error: {0}")]
    MinijinjaError(#[from] minijinja::Error),

    #[error("Git error: {0}")]
    Git2Error(#[from] git2::Error),

    #[error("Failed to parse JSON. Original error: {0}.")]
    JSONParseError(#[from] serde_json::Error),

    #[error("Failed to process YAML. Original error: {0}.")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse TOML. Original error: {0}.")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Failed to serialize TOML. Original error: {0}.")]
    TomlSerializeError(#[from] toml::ser::Error),

    /// A rendered name is defined in no scope layer. The installer attaches
    /// the destination and reports it as `TemplateKeyError`.
    #[error("Missing value for '{key}' in rendering template {template}.")]
    UndefinedKey { key: String, template: String },

    /// A template referenced a key that no scope layer defines.
    #[error("Missing value for '{key}' in rendering template {source_file} to {dest_file}. Please check your settings passed to the template.")]
    TemplateKeyError { key: String, source_file: String, dest_file: String },

    /// The destination exists, no structural merge applies and the conflict
    /// strategy is `error`.
    #[error("Unable to merge source file {incoming} into {destination} and destination file already exists")]
    MergeConflict { destination: String, incoming: String },

    #[error("Cannot merge '{key}': {message}")]
    DataShapeError { key: String, message: String },

    #[error("Failed to load '{path}': {message}")]
    ParseError { path: String, message: String },

    #[error("Unable to rollback changes to {dir} for {component}. Not inside a git repo. Have you run `git init` yet?")]
    NotARepository { component: String, dir: String },

    #[error("Unable to rollback changes to {dir} for {component}. No commits to repo yet, or you don't have a commit checked out. You must have at least made an initial commit and have it checked out in order to rollback. Try `git add -A && git commit --allow-empty -m \"initial commit\"`")]
    NoCurrentCommit { component: String, dir: String },

    /// An external process exited non-zero or could not be started.
    #[error("{}", format_command_error(.command, .code, .stdout, .stderr))]
    CommandError { command: String, code: Option<i32>, stdout: String, stderr: String },

    #[error("Invalid parameters file '{path}': {message}")]
    ParamsFileError { path: String, message: String },

    #[error("Parameters not found for installer: '{installer}'")]
    ParametersNotFound { installer: String },

    #[error("Cannot proceed: installer '{installer}' does not exist at '{source_dir}'.")]
    InstallerNotFound { installer: String, source_dir: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn format_command_error(
    command: &str,
    code: &Option<i32>,
    stdout: &str,
    stderr: &str,
) -> String {
    fn indent_or_none(part: &str) -> String {
        let part = part.trim_end();
        if part.is_empty() {
            " (none)".to_string()
        } else {
            format!("\n    {}", part.replace('\n', "\n    "))
        }
    }

    let code = code.map_or_else(|| "(none)".to_string(), |c| c.to_string());
    format!(
        "command: {command}\nreturn code: {code}\nstdout:{}\nstderr:{}",
        indent_or_none(stdout),
        indent_or_none(stderr)
    )
}

/// Convenience type alias for Results with the crate error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Default error handler that logs the failure, points the operator at the
/// persisted log and exits the program.
///
/// # Arguments
/// * `err` - The error to handle
/// * `log_file` - Location of the persisted log, if one was opened
pub fn default_error_handler(err: Error, log_file: Option<&std::path::Path>) -> ! {
    log::error!(target: "main", "{err}");
    if let Some(log_file) = log_file {
        eprintln!("See {} for details.\n", log_file.display());
    }
    std::process::exit(crate::constants::exit_codes::FAILURE);
}
