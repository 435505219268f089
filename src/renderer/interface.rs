use crate::error::Result;
use crate::renderer::Scope;
use std::path::Path;

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders a template string against a layered scope.
    ///
    /// # Arguments
    /// * `template` - Template string to render
    /// * `scope` - Variable layers consulted in order
    /// * `template_name` - Optional name for the template (used in error messages)
    ///
    /// # Returns
    /// * `Result<String>` - Rendered text, or `Error::UndefinedKey` when a
    ///   referenced name is defined in no layer
    fn render(&self, template: &str, scope: &Scope, template_name: Option<&str>)
        -> Result<String>;

    /// Renders a path with the given scope.
    ///
    /// # Arguments
    /// * `template_path` - Path to render
    /// * `scope` - Variable layers consulted in order
    ///
    /// # Returns
    /// * `Result<String>` - Rendered path as string
    fn render_path(&self, template_path: &Path, scope: &Scope) -> Result<String>;
}
