use crate::constants::{exit_codes, verbosity};
use crate::merge::{ConflictStrategy, MergeStrategy};
use clap::{error::ErrorKind, CommandFactory, Parser};
use log::LevelFilter;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#;

/// Run bootstep installers into a destination directory.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Installers to run, in order. Defaults to every installer named in the
    /// parameters file.
    #[arg(value_name = "INSTALLERS")]
    pub installers: Vec<String>,

    /// Parameters file (.toml, .yaml, .yml or .json).
    #[arg(short, long = "params", value_name = "FILE")]
    pub params: PathBuf,

    /// Directory under which to find installers.
    #[arg(short, long = "installers-dir", value_name = "DIR")]
    pub installers_dir: Option<PathBuf>,

    /// Destination directory.
    #[arg(short = 'C', long = "dest-dir", value_name = "DIR", default_value = ".")]
    pub dest_dir: PathBuf,

    /// Do not revert the destination when an installer fails.
    #[arg(long = "no-rollback")]
    pub no_rollback: bool,

    /// What to do when an existing file has no structural merge rule.
    #[arg(long, value_enum, default_value_t = ConflictStrategy::Error)]
    pub conflict_strategy: ConflictStrategy,

    /// How colliding values in structured files combine.
    #[arg(long, value_enum, default_value_t = MergeStrategy::TypesafeAdditive)]
    pub merge_strategy: MergeStrategy,

    /// Increase logging verbosity (`-v`, `-vv`).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write the persisted log here instead of the user data directory.
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

/// Parse command line arguments with custom handling for missing required inputs.
pub fn get_args() -> Args {
    Args::try_parse().unwrap_or_else(|e| {
        if e.kind() == ErrorKind::MissingRequiredArgument {
            let mut command = Args::command().help_template(HELP_TEMPLATE);
            if let Err(print_err) = command.print_help() {
                eprintln!("Failed to display help information: {print_err}");
            } else {
                println!();
            }
            std::process::exit(exit_codes::FAILURE);
        } else {
            e.exit();
        }
    })
}

/// Map `-v` counts to the appropriate log level.
pub fn get_log_level_from_verbose(verbose_count: u8) -> LevelFilter {
    match verbose_count {
        verbosity::INFO => LevelFilter::Info,
        verbosity::DEBUG => LevelFilter::Debug,
        verbosity::TRACE.. => LevelFilter::Trace,
    }
}
