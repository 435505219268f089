use std::path::PathBuf;

use crate::merge::MergeOutcome;

/// What the file pass did with one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOperation {
    /// Rendered content or rendered name was empty.
    Skip { source: PathBuf },
    /// The destination did not exist.
    Copy { source: PathBuf, target: PathBuf },
    /// The destination existed and went through the merge engine.
    Merge { source: PathBuf, target: PathBuf, outcome: MergeOutcome },
}

impl FileOperation {
    /// Gets a message describing the operation.
    pub fn get_message(&self) -> String {
        match self {
            FileOperation::Skip { source } => {
                format!("Skipping '{}' (rendered empty)", source.display())
            }
            FileOperation::Copy { target, .. } => {
                format!("Copying to '{}'", target.display())
            }
            FileOperation::Merge { target, outcome, .. } => match outcome {
                MergeOutcome::Copied => format!("Copying to '{}'", target.display()),
                MergeOutcome::Merged(role) => {
                    format!("Merging with '{}' ({role})", target.display())
                }
                MergeOutcome::Replaced => {
                    format!("Replacing '{}' (forced)", target.display())
                }
            },
        }
    }
}
