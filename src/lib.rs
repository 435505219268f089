/// Handles argument parsing and drives installer runs.
pub mod cli;

/// Parameter file loading.
pub mod config;

/// Shared constants.
pub mod constants;

/// Defines custom error types.
pub mod error;

/// Extension traits for standard library types.
pub mod ext;

/// Installers: script stages and the file pass.
pub mod installer;

/// A set of helpers for working with the file system.
pub mod ioutils;

/// Console and persisted-file logging.
pub mod logging;

/// Format-aware merging of rendered files into existing ones.
pub mod merge;

/// External process execution.
pub mod process;

/// Template parsing and rendering functionality.
pub mod renderer;

/// Reverting the destination tree when an installer fails.
pub mod rollback;
