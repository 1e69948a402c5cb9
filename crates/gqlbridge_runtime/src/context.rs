//! Request-scoped execution context.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Execution context shared read-only by all resolvers of a request.
///
/// Clones are cheap: the contents sit behind `Arc`s and are copied only
/// when a clone is modified.
#[derive(Clone, Default)]
pub struct Context {
    data: Arc<HashMap<String, Value>>,
    typed: Arc<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
    variables: Arc<Map<String, Value>>,
}

impl Context {
    /// Creates a new context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value in the context.
    pub fn set<T: Serialize>(&mut self, key: impl Into<String>, value: T) {
        if let Ok(v) = serde_json::to_value(value) {
            Arc::make_mut(&mut self.data).insert(key.into(), v);
        }
    }

    /// Builder form of [`Context::set`].
    #[must_use]
    pub fn with<T: Serialize>(mut self, key: impl Into<String>, value: T) -> Self {
        self.set(key, value);
        self
    }

    /// Gets a value from the context.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Gets a raw JSON value from the context.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Stores a typed value, one per Rust type.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        Arc::make_mut(&mut self.typed).insert(TypeId::of::<T>(), Arc::new(value));
    }

    /// Gets a typed value stored with [`Context::insert`].
    pub fn data<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.typed
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Returns the coerced variables of the running operation.
    pub fn variables(&self) -> &Map<String, Value> {
        &self.variables
    }

    /// Gets a variable by name.
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Returns a copy of this context carrying `variables`.
    #[must_use]
    pub fn with_variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables = Arc::new(variables);
        self
    }

    /// Returns all JSON values.
    pub fn values(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("data", &self.data)
            .field("typed_values", &self.typed.len())
            .field("variables", &self.variables)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct RequestId(u64);

    #[test]
    fn test_json_values() {
        let ctx = Context::new().with("user", serde_json::json!({"id": 1}));
        assert_eq!(ctx.get::<serde_json::Value>("user").unwrap()["id"], 1);
        assert!(ctx.get::<String>("missing").is_none());
    }

    #[test]
    fn test_typed_values() {
        let mut ctx = Context::new();
        ctx.insert(RequestId(7));
        assert_eq!(ctx.data::<RequestId>(), Some(&RequestId(7)));
        assert!(ctx.data::<String>().is_none());
    }

    #[test]
    fn test_clones_are_independent() {
        let base = Context::new().with("a", 1);
        let mut copy = base.clone();
        copy.set("a", 2);
        assert_eq!(base.get::<i64>("a"), Some(1));
        assert_eq!(copy.get::<i64>("a"), Some(2));
    }
}
