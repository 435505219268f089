//! Merge and conflict policies shared by every structured format.

use clap::ValueEnum;
use serde::Deserialize;
use std::fmt::Display;

use crate::error::{Error, Result};

/// What happens when an existing destination has no structural merge rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[value(rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum ConflictStrategy {
    /// Abort with a merge conflict.
    #[default]
    #[serde(alias = "error")]
    Error,
    /// Replace the destination with the incoming file.
    #[serde(alias = "force")]
    Force,
}

impl Display for ConflictStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConflictStrategy::Error => "ERROR",
            ConflictStrategy::Force => "FORCE",
        };
        write!(f, "{s}")
    }
}

/// How colliding values of two structured documents combine.
///
/// Mappings always merge key by key. The strategy decides every other
/// collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[value(rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// Incoming value wins.
    Replace,
    /// Sequences concatenate, otherwise the incoming value wins.
    Additive,
    /// Kinds must match, then the incoming value wins.
    TypesafeReplace,
    /// Kinds must match, sequences concatenate and differing scalars are an error.
    #[default]
    TypesafeAdditive,
}

impl Display for MergeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MergeStrategy::Replace => "replace",
            MergeStrategy::Additive => "additive",
            MergeStrategy::TypesafeReplace => "typesafe-replace",
            MergeStrategy::TypesafeAdditive => "typesafe-additive",
        };
        write!(f, "{s}")
    }
}

/// Coarse type of a structured value, shared by the TOML and YAML models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Mapping,
    Sequence,
    String,
    Integer,
    Float,
    Boolean,
    Datetime,
    Null,
    Tagged,
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ValueKind::Mapping => "mapping",
            ValueKind::Sequence => "sequence",
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Boolean => "boolean",
            ValueKind::Datetime => "datetime",
            ValueKind::Null => "null",
            ValueKind::Tagged => "tagged value",
        };
        write!(f, "{s}")
    }
}

/// What to do with a key present on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Recurse,
    Concatenate,
    KeepExisting,
    TakeIncoming,
}

impl MergeStrategy {
    fn is_typesafe(self) -> bool {
        matches!(self, MergeStrategy::TypesafeReplace | MergeStrategy::TypesafeAdditive)
    }

    fn is_additive(self) -> bool {
        matches!(self, MergeStrategy::Additive | MergeStrategy::TypesafeAdditive)
    }

    /// Decides how the value at `key` combines.
    ///
    /// `equal` tells whether both values are identical; it only matters for
    /// scalars under `typesafe-additive`.
    pub fn resolve(
        self,
        key: &str,
        existing: ValueKind,
        incoming: ValueKind,
        equal: bool,
    ) -> Result<Resolution> {
        if existing == ValueKind::Mapping && incoming == ValueKind::Mapping {
            return Ok(Resolution::Recurse);
        }

        if existing != incoming {
            if self.is_typesafe() {
                return Err(Error::DataShapeError {
                    key: key.to_string(),
                    message: format!(
                        "existing value is a {existing} but incoming value is a {incoming}"
                    ),
                });
            }
            return Ok(Resolution::TakeIncoming);
        }

        if existing == ValueKind::Sequence && self.is_additive() {
            return Ok(Resolution::Concatenate);
        }

        match self {
            MergeStrategy::TypesafeAdditive if equal => Ok(Resolution::KeepExisting),
            MergeStrategy::TypesafeAdditive => Err(Error::DataShapeError {
                key: key.to_string(),
                message: format!(
                    "both sides define a different {existing} and it will not be overwritten"
                ),
            }),
            _ => Ok(Resolution::TakeIncoming),
        }
    }
}

/// Joins a parent key path and a child key with `.`.
pub(crate) fn child_key(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}
