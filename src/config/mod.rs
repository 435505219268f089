//! Parameter files driving an install run
//!
//! - `loader`: parameter file parsing and per-installer lookup

pub mod loader;

pub use loader::{InstallerMeta, Params, ParamsFormat};
