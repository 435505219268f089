use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Captured result of a finished external process.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

fn display_command(program: &OsStr, args: &[&OsStr]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

fn run(program: &OsStr, args: &[&OsStr], cwd: &Path) -> Result<CommandOutput> {
    let command = display_command(program, args);
    log::debug!("Running command: {command} (cwd: {})", cwd.display());

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| Error::CommandError {
            command: command.clone(),
            code: None,
            stdout: String::new(),
            stderr: e.to_string(),
        })?;

    let result = CommandOutput {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    log::debug!("Ran command: {command}, returncode = {:?}", result.code);
    Ok(result)
}

/// Runs `program` with `args` in `cwd`, blocking until it exits.
///
/// Stdout and stderr are captured. A non-zero exit is an error carrying the
/// command, exit code and captured output; a process that cannot be started
/// is reported as a `CommandError` without an exit code.
pub fn run_checked<P, S>(program: P, args: &[S], cwd: &Path) -> Result<CommandOutput>
where
    P: AsRef<OsStr>,
    S: AsRef<OsStr>,
{
    let program = program.as_ref();
    let args: Vec<&OsStr> = args.iter().map(AsRef::as_ref).collect();
    let output = run(program, &args, cwd)?;
    if !output.success() {
        return Err(Error::CommandError {
            command: display_command(program, &args),
            code: output.code,
            stdout: output.stdout,
            stderr: output.stderr,
        });
    }
    Ok(output)
}
