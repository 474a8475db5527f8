//! Handler and validator registries.
//!
//! Both registries are plain name → callback maps built at startup and handed
//! to the dispatcher. A name that is not registered is reported as an outcome
//! code at request time, never as a startup error.

use heron_core::{Outcome, RequestContext};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A resource handler.
pub type Handler = Arc<dyn Fn(&mut RequestContext) -> Outcome + Send + Sync>;

/// A custom parameter validator. Receives the extracted value and the context.
pub type Validator = Arc<dyn Fn(&Value, &RequestContext) -> Outcome + Send + Sync>;

/// Handler name → handler.
///
/// # Example
///
/// ```
/// use heron_core::Outcome;
/// use heron_pipeline::HandlerRegistry;
/// use serde_json::json;
///
/// let mut handlers = HandlerRegistry::new();
/// handlers.register("list_users", |_ctx| Outcome::success(json!([])));
/// assert!(handlers.contains("list_users"));
/// ```
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Handler>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler, replacing any previous one with the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&mut RequestContext) -> Outcome + Send + Sync + 'static,
    {
        self.handlers.insert(name.into(), Arc::new(handler));
    }

    /// Looks up a handler.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Handler> {
        self.handlers.get(name)
    }

    /// Returns true if a handler is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Returns the registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}

/// Validator identifier → validator.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    validators: HashMap<String, Validator>,
}

impl ValidatorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a validator, replacing any previous one with the same id.
    pub fn register<F>(&mut self, id: impl Into<String>, validator: F)
    where
        F: Fn(&Value, &RequestContext) -> Outcome + Send + Sync + 'static,
    {
        self.validators.insert(id.into(), Arc::new(validator));
    }

    /// Looks up a validator.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Validator> {
        self.validators.get(id)
    }

    /// Returns the number of registered validators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Returns true if no validator is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.validators.keys().collect();
        ids.sort_unstable();
        f.debug_struct("ValidatorRegistry")
            .field("validators", &ids)
            .finish()
    }
}
