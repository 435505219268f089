//! Merge engine reconciling a freshly rendered file with an existing one
//!
//! The destination's base name selects a [`FileRole`] from an ordered glob
//! table (first match wins). Structured roles are loaded, combined under a
//! [`MergeStrategy`] and written back atomically; files without a role fall
//! back to the [`ConflictStrategy`].
//!
//! - `strategy`: merge and conflict policies
//! - `toml`: key/value documents
//! - `yaml`: mapping or sequence documents
//! - `lines`: append-only line lists

pub mod lines;
pub mod strategy;
pub mod toml;
pub mod yaml;

use std::fmt::Display;
use std::path::Path;

use globset::Glob;

use crate::error::{Error, Result};
use crate::ext::PathExt;
use crate::ioutils::{copy_file, write_atomic};

pub use strategy::{ConflictStrategy, MergeStrategy, ValueKind};

/// Merge behavior selected for a destination file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    /// TOML-like key/value document.
    KeyValue,
    /// YAML-like mapping or sequence document.
    ListOrMap,
    /// Ignore-file-like list of lines.
    LineList,
    /// No structural merge; the file is copied or treated as a conflict.
    Unrecognized,
}

/// Base-name patterns and their roles. Order is significant.
pub const FILE_ROLES: &[(&str, FileRole)] = &[
    (".gitignore", FileRole::LineList),
    ("*.toml", FileRole::KeyValue),
    ("*.yml", FileRole::ListOrMap),
    ("*.yaml", FileRole::ListOrMap),
];

impl Display for FileRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FileRole::KeyValue => "key/value",
            FileRole::ListOrMap => "list/map",
            FileRole::LineList => "line list",
            FileRole::Unrecognized => "unrecognized",
        };
        write!(f, "{s}")
    }
}

impl FileRole {
    /// Classifies `path` by its base name against [`FILE_ROLES`].
    pub fn classify(path: &Path) -> Result<FileRole> {
        let name = path.base_name();
        for (pattern, role) in FILE_ROLES {
            if Glob::new(pattern)?.compile_matcher().is_match(&name) {
                return Ok(*role);
            }
        }
        Ok(FileRole::Unrecognized)
    }

    pub fn load(self, path: &Path) -> Result<Document> {
        match self {
            FileRole::KeyValue => Ok(Document::KeyValue(toml::load(path)?)),
            FileRole::ListOrMap => Ok(Document::ListOrMap(yaml::load(path)?)),
            FileRole::LineList => Ok(Document::Lines(lines::load(path)?)),
            FileRole::Unrecognized => Err(Error::Other(anyhow::anyhow!(
                "'{}' has no structural format to load",
                path.display()
            ))),
        }
    }
}

/// A loaded structured file.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    KeyValue(::toml::Table),
    ListOrMap(serde_yaml::Value),
    Lines(Vec<String>),
}

impl Document {
    /// Combines `self` (existing) with `incoming`.
    pub fn merge(self, incoming: Document, strategy: MergeStrategy) -> Result<Document> {
        match (self, incoming) {
            (Document::KeyValue(mut existing), Document::KeyValue(incoming)) => {
                toml::merge_tables(&mut existing, incoming, strategy, "")?;
                Ok(Document::KeyValue(existing))
            }
            (Document::ListOrMap(existing), Document::ListOrMap(incoming)) => {
                Ok(Document::ListOrMap(yaml::merge_documents(existing, incoming, strategy)?))
            }
            (Document::Lines(existing), Document::Lines(incoming)) => {
                Ok(Document::Lines(lines::merge_lines(existing, incoming)))
            }
            _ => Err(Error::DataShapeError {
                key: "<document>".to_string(),
                message: "documents of different formats cannot be merged".to_string(),
            }),
        }
    }

    pub fn dump(&self) -> Result<String> {
        match self {
            Document::KeyValue(table) => toml::dump(table),
            Document::ListOrMap(value) => yaml::dump(value),
            Document::Lines(list) => Ok(lines::dump(list)),
        }
    }
}

/// What [`merge_file`] did to the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The destination did not exist and received the incoming file.
    Copied,
    /// Both files were combined structurally.
    Merged(FileRole),
    /// The destination was overwritten under `ConflictStrategy::Force`.
    Replaced,
}

/// Reconciles `incoming` into `destination`.
///
/// The destination is only ever replaced as a whole: a load, shape or
/// conflict error leaves it untouched.
pub fn merge_file(
    destination: &Path,
    incoming: &Path,
    merge_strategy: MergeStrategy,
    conflict_strategy: ConflictStrategy,
) -> Result<MergeOutcome> {
    let role = FileRole::classify(destination)?;

    if !destination.exists() {
        copy_file(incoming, destination)?;
        return Ok(MergeOutcome::Copied);
    }

    if role == FileRole::Unrecognized {
        return handle_conflict(destination, incoming, conflict_strategy);
    }

    log::debug!("Merging {} as {role} with {merge_strategy}", destination.display());
    let existing = role.load(destination)?;
    let incoming = role.load(incoming)?;
    let merged = existing.merge(incoming, merge_strategy)?;
    write_atomic(destination, merged.dump()?.as_bytes())?;
    Ok(MergeOutcome::Merged(role))
}

fn handle_conflict(
    destination: &Path,
    incoming: &Path,
    strategy: ConflictStrategy,
) -> Result<MergeOutcome> {
    match strategy {
        ConflictStrategy::Error => Err(Error::MergeConflict {
            destination: destination.display().to_string(),
            incoming: incoming.display().to_string(),
        }),
        ConflictStrategy::Force => {
            log::warn!(
                "Overwriting {} with {} (conflict strategy {strategy})",
                destination.display(),
                incoming.display()
            );
            write_atomic(destination, &std::fs::read(incoming)?)?;
            Ok(MergeOutcome::Replaced)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn classification_follows_table_order() {
        let cases = [
            (".gitignore", FileRole::LineList),
            ("Cargo.toml", FileRole::KeyValue),
            (".config.toml", FileRole::KeyValue),
            ("ci.yml", FileRole::ListOrMap),
            ("docker-compose.yaml", FileRole::ListOrMap),
            ("README.md", FileRole::Unrecognized),
            ("gitignore", FileRole::Unrecognized),
            ("toml", FileRole::Unrecognized),
        ];
        for (name, role) in cases {
            let path = Path::new("some/dir").join(name);
            assert_eq!(FileRole::classify(&path).unwrap(), role, "{name}");
        }
    }

    #[test]
    fn classification_uses_base_name_only() {
        let role = FileRole::classify(Path::new("conf.toml/notes.txt")).unwrap();
        assert_eq!(role, FileRole::Unrecognized);
    }

    #[test]
    fn mixed_documents_do_not_merge() {
        let err = Document::Lines(vec![])
            .merge(Document::KeyValue(::toml::Table::new()), MergeStrategy::Replace)
            .unwrap_err();
        assert!(matches!(err, Error::DataShapeError { .. }));
    }

    #[test]
    fn missing_destination_is_a_plain_copy() {
        let dir = TempDir::new().unwrap();
        let incoming = dir.path().join("incoming.md");
        let destination = dir.path().join("README.md");
        fs::write(&incoming, "# hello\n").unwrap();

        let outcome = merge_file(
            &destination,
            &incoming,
            MergeStrategy::default(),
            ConflictStrategy::Error,
        )
        .unwrap();

        assert_eq!(outcome, MergeOutcome::Copied);
        assert_eq!(fs::read_to_string(destination).unwrap(), "# hello\n");
    }

    #[test]
    fn failed_merge_leaves_destination_untouched() {
        let dir = TempDir::new().unwrap();
        let incoming = dir.path().join("incoming.toml");
        let destination = dir.path().join("config.toml");
        fs::write(&incoming, "a = 1\n").unwrap();
        fs::write(&destination, "a = 2\n").unwrap();

        let result = merge_file(
            &destination,
            &incoming,
            MergeStrategy::TypesafeAdditive,
            ConflictStrategy::Force,
        );

        assert!(matches!(result, Err(Error::DataShapeError { .. })));
        assert_eq!(fs::read_to_string(destination).unwrap(), "a = 2\n");
    }

    #[test]
    fn malformed_destination_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let incoming = dir.path().join("incoming.toml");
        let destination = dir.path().join("config.toml");
        fs::write(&incoming, "a = 1\n").unwrap();
        fs::write(&destination, "this is = = not toml").unwrap();

        let result =
            merge_file(&destination, &incoming, MergeStrategy::default(), ConflictStrategy::Error);

        assert!(matches!(result, Err(Error::ParseError { .. })));
        assert_eq!(fs::read_to_string(destination).unwrap(), "this is = = not toml");
    }
}
