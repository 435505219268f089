//! YAML documents: a top-level mapping or sequence.
//!
//! Mappings merge key by key, sequences concatenate. A mapping document
//! never merges with a sequence document.

use std::path::Path;

use serde_yaml::{Mapping, Value as YamlValue};

use super::strategy::{child_key, MergeStrategy, Resolution, ValueKind};
use crate::error::{Error, Result};

fn kind(value: &YamlValue) -> ValueKind {
    match value {
        YamlValue::Null => ValueKind::Null,
        YamlValue::Bool(_) => ValueKind::Boolean,
        YamlValue::Number(n) if n.is_f64() => ValueKind::Float,
        YamlValue::Number(_) => ValueKind::Integer,
        YamlValue::String(_) => ValueKind::String,
        YamlValue::Sequence(_) => ValueKind::Sequence,
        YamlValue::Mapping(_) => ValueKind::Mapping,
        YamlValue::Tagged(_) => ValueKind::Tagged,
    }
}

fn key_name(key: &YamlValue) -> String {
    match key {
        YamlValue::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_else(|_| format!("{other:?}")),
    }
}

/// Loads a YAML document. An empty or null document is an empty mapping; a
/// scalar at the top level is rejected.
pub fn load(path: &Path) -> Result<YamlValue> {
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(YamlValue::Mapping(Mapping::new()));
    }

    let value: YamlValue = serde_yaml::from_str(&content).map_err(|e| Error::ParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    match value {
        YamlValue::Mapping(_) | YamlValue::Sequence(_) => Ok(value),
        YamlValue::Null => Ok(YamlValue::Mapping(Mapping::new())),
        _ => Err(Error::ParseError {
            path: path.display().to_string(),
            message: "YAML value is unexpected; it should be a dictionary or a list. \
                      check the YAML syntax and try again"
                .to_string(),
        }),
    }
}

pub fn dump(value: &YamlValue) -> Result<String> {
    Ok(serde_yaml::to_string(value)?)
}

/// Combines two loaded documents.
pub fn merge_documents(
    existing: YamlValue,
    incoming: YamlValue,
    strategy: MergeStrategy,
) -> Result<YamlValue> {
    match (existing, incoming) {
        (YamlValue::Mapping(mut existing), YamlValue::Mapping(incoming)) => {
            merge_mappings(&mut existing, incoming, strategy, "")?;
            Ok(YamlValue::Mapping(existing))
        }
        (YamlValue::Sequence(mut existing), YamlValue::Sequence(incoming)) => {
            existing.extend(incoming);
            Ok(YamlValue::Sequence(existing))
        }
        (existing, incoming) => Err(Error::DataShapeError {
            key: "<document>".to_string(),
            message: format!(
                "YAML values are different data types ({} and {}) and cannot be merged",
                kind(&existing),
                kind(&incoming)
            ),
        }),
    }
}

/// Deep-merges `incoming` into `existing` under `strategy`.
pub fn merge_mappings(
    existing: &mut Mapping,
    incoming: Mapping,
    strategy: MergeStrategy,
    parent: &str,
) -> Result<()> {
    for (key, value) in incoming {
        let path = child_key(parent, &key_name(&key));
        let Some(current) = existing.get_mut(&key) else {
            existing.insert(key, value);
            continue;
        };

        match strategy.resolve(&path, kind(current), kind(&value), *current == value)? {
            Resolution::Recurse => {
                if let (YamlValue::Mapping(current), YamlValue::Mapping(value)) = (current, value)
                {
                    merge_mappings(current, value, strategy, &path)?;
                }
            }
            Resolution::Concatenate => {
                if let (YamlValue::Sequence(current), YamlValue::Sequence(value)) =
                    (current, value)
                {
                    current.extend(value);
                }
            }
            Resolution::KeepExisting => {}
            Resolution::TakeIncoming => *current = value,
        }
    }
    Ok(())
}
