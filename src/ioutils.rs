use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{NamedTempFile, TempDir};

use crate::error::{Error, Result};

pub fn create_dir_all<P: AsRef<Path>>(dest_path: P) -> Result<()> {
    let dest_path = dest_path.as_ref();
    std::fs::create_dir_all(dest_path).map_err(Error::IoError)
}

pub fn copy_file<P: AsRef<Path>, Q: AsRef<Path>>(source_path: P, dest_path: Q) -> Result<()> {
    let dest_path = dest_path.as_ref();
    if let Some(parent) = dest_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }
    std::fs::copy(source_path, dest_path).map(|_| ()).map_err(Error::IoError)
}

/// Replaces `dest_path` with `content` so that readers only ever observe the
/// old or the complete new file.
///
/// The content is staged in a temporary file next to the destination and
/// renamed over it.
pub fn write_atomic<P: AsRef<Path>>(dest_path: P, content: &[u8]) -> Result<()> {
    let dest_path = dest_path.as_ref();
    let parent = match dest_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut staged = NamedTempFile::new_in(&parent)?;
    staged.write_all(content)?;
    if let Ok(existing) = std::fs::metadata(dest_path) {
        staged.as_file().set_permissions(existing.permissions())?;
    }
    staged.as_file().sync_all()?;
    staged.persist(dest_path).map_err(|e| Error::IoError(e.error))?;
    Ok(())
}

/// Restricts a file to owner read + execute.
#[cfg(unix)]
pub fn make_executable<P: AsRef<Path>>(path: P) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o500))
        .map_err(Error::IoError)
}

#[cfg(not(unix))]
pub fn make_executable<P: AsRef<Path>>(_path: P) -> Result<()> {
    Ok(())
}

/// A path inside a private temporary directory.
///
/// The directory and anything written to the path are removed when the value
/// is dropped, on success and error paths alike.
pub struct ScratchFile {
    _dir: TempDir,
    path: PathBuf,
}

impl ScratchFile {
    /// Allocates a fresh temporary directory and reserves `file_name` inside it.
    pub fn new(file_name: &str) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("bootstep").tempdir()?;
        let name = if file_name.is_empty() { "scratch" } else { file_name };
        let path = dir.path().join(name);
        Ok(Self { _dir: dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
