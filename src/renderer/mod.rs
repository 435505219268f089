//! Template rendering for installer paths, files and scripts
//!
//! - `interface`: the `TemplateRenderer` trait
//! - `minijinja`: the MiniJinja-backed implementation
//! - `scope`: layered variable lookup
//! - `filters`: custom filters registered with the engine

pub mod filters;
pub mod interface;
pub mod minijinja;
pub mod scope;

pub use interface::TemplateRenderer;
pub use self::minijinja::MiniJinjaRenderer;
pub use scope::{MissingKey, Scope};

/// Returns the renderer used by installers.
pub fn get_template_engine() -> MiniJinjaRenderer {
    MiniJinjaRenderer::new()
}
