//! Platform-specific install script discovery and execution.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::ext::PathExt;
use crate::ioutils::{make_executable, ScratchFile};
use crate::process::{run_checked, CommandOutput};
use crate::renderer::{Scope, TemplateRenderer};

use super::render_file;

#[cfg(windows)]
const PYTHON: ScriptRunner = ScriptRunner::Interpreter("python", &[]);
#[cfg(not(windows))]
const PYTHON: ScriptRunner = ScriptRunner::Interpreter("python3", &[]);

const POWERSHELL: ScriptRunner = ScriptRunner::Interpreter(
    "powershell",
    &["-NoLogo", "-NonInteractive", "-ExecutionPolicy", "Bypass", "-File"],
);

/// Script extensions tried for `os`, in priority order. Every list ends with
/// the interpreted `.py` fallback.
pub fn extensions_for(os: &str) -> &'static [&'static str] {
    match os {
        "windows" => &[".cmd", ".bat", ".ps", ".py"],
        "linux" | "macos" => &[".sh", ".bash", "", ".py"],
        _ => &[".py"],
    }
}

/// Returns the first `source_dir/script_base<ext>` that is a file, trying the
/// current OS's extensions in order.
pub fn find_script(source_dir: &Path, script_base: &str) -> Option<PathBuf> {
    find_script_for(std::env::consts::OS, source_dir, script_base)
}

pub fn find_script_for(os: &str, source_dir: &Path, script_base: &str) -> Option<PathBuf> {
    extensions_for(os)
        .iter()
        .map(|ext| source_dir.join(format!("{script_base}{ext}")))
        .find(|candidate| candidate.is_file())
}

/// How a rendered script is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptRunner {
    /// Executed directly; must be a native executable or carry a shebang.
    Direct,
    /// Passed as the last argument to an interpreter and its leading arguments.
    Interpreter(&'static str, &'static [&'static str]),
}

impl ScriptRunner {
    pub fn for_script(script: &Path) -> Self {
        match script.extension().and_then(|ext| ext.to_str()) {
            Some("py") => PYTHON,
            Some("ps") => POWERSHELL,
            _ => ScriptRunner::Direct,
        }
    }
}

/// File name for the rendered copy of `script`. PowerShell refuses `-File`
/// targets without a `.ps1` extension.
fn scratch_name(script: &Path) -> String {
    match script.extension().and_then(|ext| ext.to_str()) {
        Some("ps") => script.with_extension("ps1").base_name(),
        _ => script.base_name(),
    }
}

/// Renders `script` into a private temporary copy and runs it with `cwd` as
/// working directory. The copy is removed when this returns.
///
/// Returns `None` without running anything when the script renders empty.
pub fn render_and_execute_script(
    engine: &dyn TemplateRenderer,
    script: &Path,
    scope: &Scope,
    cwd: &Path,
) -> Result<Option<CommandOutput>> {
    let scratch = ScratchFile::new(&scratch_name(script))?;
    if render_file(engine, script, scratch.path(), scratch.path(), scope)? == 0 {
        return Ok(None);
    }

    match ScriptRunner::for_script(script) {
        ScriptRunner::Direct => {
            make_executable(scratch.path())?;
            run_checked(scratch.path(), &[] as &[&str], cwd).map(Some)
        }
        ScriptRunner::Interpreter(program, leading) => {
            let mut args: Vec<OsString> = leading.iter().map(OsString::from).collect();
            args.push(scratch.path().as_os_str().to_os_string());
            run_checked(program, &args, cwd).map(Some)
        }
    }
}
