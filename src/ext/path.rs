use std::path::Path;

use crate::error::{Error, Result};

/// Extension trait for Path to provide convenient string conversion methods
pub trait PathExt {
    /// Converts a path to a string slice, returning an error if the path contains invalid Unicode characters.
    ///
    /// Template engines only accept UTF-8 sources, so every path that is
    /// rendered goes through this check first.
    ///
    /// # Examples
    /// ```
    /// use bootstep::ext::PathExt;
    /// use std::path::Path;
    ///
    /// let path = Path::new("root/{{ name }}.toml");
    /// assert_eq!(path.to_str_checked().unwrap(), "root/{{ name }}.toml");
    /// ```
    fn to_str_checked(&self) -> Result<&str>;

    /// Returns the last path component as a lossy string, or an empty string
    /// for paths such as `/` or `..` that have none.
    ///
    /// # Examples
    /// ```
    /// use bootstep::ext::PathExt;
    /// use std::path::Path;
    ///
    /// assert_eq!(Path::new("installers/python").base_name(), "python");
    /// ```
    fn base_name(&self) -> String;
}

impl PathExt for Path {
    fn to_str_checked(&self) -> Result<&str> {
        self.to_str().ok_or_else(|| {
            Error::Other(anyhow::anyhow!(
                "Path '{}' contains invalid Unicode characters",
                self.display()
            ))
        })
    }

    fn base_name(&self) -> String {
        self.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
    }
}
