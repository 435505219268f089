//! Line lists such as `.gitignore`: appended, never deduplicated.

use std::path::Path;

use crate::error::Result;

pub fn load(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content.lines().map(|line| line.trim_end().to_string()).collect())
}

/// `existing ++ [""] ++ incoming`. Duplicates are kept so every merge can be
/// traced back in the resulting file.
pub fn merge_lines(mut existing: Vec<String>, incoming: Vec<String>) -> Vec<String> {
    existing.reserve(incoming.len() + 1);
    existing.push(String::new());
    existing.extend(incoming);
    existing
}

pub fn dump(lines: &[String]) -> String {
    lines.iter().fold(String::new(), |mut out, line| {
        out.push_str(line);
        out.push('\n');
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn appends_with_single_blank_separator() {
        let merged = merge_lines(owned(&["*.tmp"]), owned(&["*.log"]));
        assert_eq!(merged, owned(&["*.tmp", "", "*.log"]));
    }

    #[test]
    fn keeps_duplicates() {
        let merged = merge_lines(owned(&["target/", "*.log"]), owned(&["*.log"]));
        assert_eq!(merged, owned(&["target/", "*.log", "", "*.log"]));
    }

    #[test]
    fn empty_inputs_still_get_a_separator() {
        assert_eq!(merge_lines(vec![], vec![]), owned(&[""]));
        assert_eq!(merge_lines(vec![], owned(&["a"])), owned(&["", "a"]));
        assert_eq!(merge_lines(owned(&["a"]), vec![]), owned(&["a", ""]));
    }

    #[test]
    fn load_trims_trailing_whitespace() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(".gitignore");
        std::fs::write(&path, "*.tmp  \r\nbuild/\n").unwrap();
        assert_eq!(load(&path).unwrap(), owned(&["*.tmp", "build/"]));
    }

    #[test]
    fn dump_terminates_every_line() {
        assert_eq!(dump(&owned(&["*.tmp", "", "*.log"])), "*.tmp\n\n*.log\n");
        assert_eq!(dump(&[]), "");
    }
}
