//! TOML documents: a top-level table merged key by key.

use std::path::Path;

use toml::{Table, Value as TomlValue};

use super::strategy::{child_key, MergeStrategy, Resolution, ValueKind};
use crate::error::{Error, Result};

fn kind(value: &TomlValue) -> ValueKind {
    match value {
        TomlValue::String(_) => ValueKind::String,
        TomlValue::Integer(_) => ValueKind::Integer,
        TomlValue::Float(_) => ValueKind::Float,
        TomlValue::Boolean(_) => ValueKind::Boolean,
        TomlValue::Datetime(_) => ValueKind::Datetime,
        TomlValue::Array(_) => ValueKind::Sequence,
        TomlValue::Table(_) => ValueKind::Mapping,
    }
}

pub fn load(path: &Path) -> Result<Table> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str::<Table>(&content).map_err(|e| Error::ParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

pub fn dump(table: &Table) -> Result<String> {
    Ok(toml::to_string(table)?)
}

/// Deep-merges `incoming` into `existing` under `strategy`.
///
/// `parent` is the dotted key path of the tables, used in error messages.
pub fn merge_tables(
    existing: &mut Table,
    incoming: Table,
    strategy: MergeStrategy,
    parent: &str,
) -> Result<()> {
    for (key, value) in incoming {
        let path = child_key(parent, &key);
        let Some(current) = existing.get_mut(&key) else {
            existing.insert(key, value);
            continue;
        };

        match strategy.resolve(&path, kind(current), kind(&value), *current == value)? {
            Resolution::Recurse => {
                if let (TomlValue::Table(current), TomlValue::Table(value)) = (current, value) {
                    merge_tables(current, value, strategy, &path)?;
                }
            }
            Resolution::Concatenate => {
                if let (TomlValue::Array(current), TomlValue::Array(value)) = (current, value) {
                    current.extend(value);
                }
            }
            Resolution::KeepExisting => {}
            Resolution::TakeIncoming => *current = value,
        }
    }
    Ok(())
}
