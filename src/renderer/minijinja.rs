use super::filters;
use crate::{
    error::{Error, Result},
    ext::PathExt,
    renderer::{interface::TemplateRenderer, Scope},
};
use minijinja::{AutoEscape, Environment, ErrorKind, UndefinedBehavior};
use serde_json::json;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// MiniJinja-based template rendering engine.
///
/// Undefined names are errors rather than empty strings and nothing is
/// HTML-escaped, since installers render configuration files and scripts.
pub struct MiniJinjaRenderer {
    /// MiniJinja environment instance
    env: Environment<'static>,
    /// Lowest-priority layer appended to every scope
    default_layer: serde_json::Value,
}

impl MiniJinjaRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        filters::register(&mut env);

        let default_layer = json!({
            "platform": {
                "os": std::env::consts::OS,
                "family": std::env::consts::FAMILY,
                "arch": std::env::consts::ARCH,
            }
        });

        Self { env, default_layer }
    }

    fn render_internal(&self, template: &str, scope: &Scope, name: &str) -> Result<String> {
        let (context, missing) = scope.clone().with_layer(&self.default_layer).into_context();
        self.env
            .render_named_str(name, template, context)
            .map_err(|e| Self::describe_error(e, template, name, &missing))
    }

    /// Names the key behind an undefined-value error.
    ///
    /// Lookups that miss the scope are not always failures (`is defined`,
    /// `default(...)` and builtin globals such as `range` all probe it first),
    /// so a recorded miss only counts when it appears in the failing
    /// expression.
    fn describe_error(
        err: minijinja::Error,
        template: &str,
        name: &str,
        missing: &Arc<Mutex<Vec<String>>>,
    ) -> Error {
        if err.kind() != ErrorKind::UndefinedError {
            return Error::MinijinjaError(err);
        }
        let misses = missing.lock().map(|misses| misses.clone()).unwrap_or_default();
        let key = err
            .range()
            .and_then(|range| template.get(range))
            .and_then(|expr| Self::key_in_expression(expr, &misses))
            .or_else(|| err.detail().map(str::to_string))
            .unwrap_or_else(|| "undefined value".to_string());
        Error::UndefinedKey { key, template: name.to_string() }
    }

    fn key_in_expression(expr: &str, misses: &[String]) -> Option<String> {
        let is_ident = |c: char| c.is_alphanumeric() || c == '_';
        let idents: Vec<&str> = expr.split(|c: char| !is_ident(c)).collect();
        if let Some(miss) = misses.iter().find(|miss| idents.contains(&miss.as_str())) {
            return Some(miss.clone());
        }

        // Every top-level name resolved; the failure is an attribute path.
        let expr = expr.trim();
        let is_path = !expr.is_empty() && expr.chars().all(|c| is_ident(c) || c == '.');
        is_path.then(|| expr.to_string())
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn render(
        &self,
        template: &str,
        scope: &Scope,
        template_name: Option<&str>,
    ) -> Result<String> {
        self.render_internal(template, scope, template_name.unwrap_or("temp"))
    }

    fn render_path(&self, template_path: &Path, scope: &Scope) -> Result<String> {
        let path_str = template_path.to_str_checked()?;
        self.render_internal(path_str, scope, path_str)
    }
}
