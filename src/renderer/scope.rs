//! Layered variable scope consulted while rendering templates.

use std::sync::{Arc, Mutex};

use minijinja::value::{Object, Value};
use serde::Serialize;

/// Outcome of a lookup that exhausted every layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingKey(pub String);

/// An ordered list of immutable variable layers, most specific first.
///
/// Layers are never mutated once added; building a derived scope leaves the
/// values it was built from untouched.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    layers: Vec<Value>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `layer` with lower priority than every existing layer.
    pub fn with_layer<S: Serialize + ?Sized>(mut self, layer: &S) -> Self {
        self.layers.push(Value::from_serialize(layer));
        self
    }

    /// Returns the value of `key` from the first layer that defines it.
    pub fn lookup(&self, key: &str) -> Result<Value, MissingKey> {
        self.layers
            .iter()
            .find_map(|layer| layer.get_attr(key).ok().filter(|value| !value.is_undefined()))
            .ok_or_else(|| MissingKey(key.to_string()))
    }

    /// Wraps the scope as a template context that records, in lookup order,
    /// every name it could not resolve.
    pub(crate) fn into_context(self) -> (Value, Arc<Mutex<Vec<String>>>) {
        let missing = Arc::new(Mutex::new(Vec::new()));
        let context = ScopeContext { scope: self, missing: Arc::clone(&missing) };
        (Value::from_object(context), missing)
    }
}

#[derive(Debug)]
struct ScopeContext {
    scope: Scope,
    missing: Arc<Mutex<Vec<String>>>,
}

impl Object for ScopeContext {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let name = key.as_str()?;
        match self.scope.lookup(name) {
            Ok(value) => Some(value),
            Err(MissingKey(name)) => {
                if let Ok(mut missing) = self.missing.lock() {
                    missing.push(name);
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_layer_defining_key_wins() {
        let scope = Scope::new()
            .with_layer(&json!({"name": "config"}))
            .with_layer(&json!({"name": "meta", "only_meta": 1}));

        assert_eq!(scope.lookup("name").unwrap().as_str(), Some("config"));
        assert_eq!(scope.lookup("only_meta").unwrap().as_i64(), Some(1));
    }

    #[test]
    fn lookup_fails_only_after_all_layers() {
        let scope =
            Scope::new().with_layer(&json!({"a": 1})).with_layer(&json!({"b": 2}));

        assert_eq!(scope.lookup("c"), Err(MissingKey("c".to_string())));
    }

    #[test]
    fn null_values_are_defined() {
        let scope = Scope::new().with_layer(&json!({"nothing": null}));
        assert!(scope.lookup("nothing").unwrap().is_none());
    }

    #[test]
    fn layering_does_not_touch_the_source_value() {
        let config = json!({"a": 1});
        let scope = Scope::new().with_layer(&config).with_layer(&json!({"b": 2}));

        assert_eq!(scope.lookup("b").unwrap().as_i64(), Some(2));
        assert_eq!(config, json!({"a": 1}));
    }
}
