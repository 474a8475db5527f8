//! The schema registry.
//!
//! A [`SchemaRegistry`] is built once at startup from three documents and is
//! read-only afterwards:
//!
//! - routes: path → method → [`ResourceDefinition`]
//! - codes: code identifier → [`ResponseCode`]
//! - messages: custom-message key → locale → text
//!
//! Built-in codes are always present; schema codes with the same identifier
//! replace them.

use crate::codes::{builtin_codes, CodeTable, ResponseCode};
use crate::context::normalize_path;
use crate::error::{SchemaError, SchemaResult};
use crate::resource::ResourceDefinition;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Path → method → resource, as found in the routes document.
pub type RouteTable = HashMap<String, HashMap<String, ResourceDefinition>>;

/// Custom-message key → locale → text.
pub type MessageTable = HashMap<String, IndexMap<String, String>>;

/// Result of looking up a (path, method) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The resource declared for the pair.
    Found(&'a Arc<ResourceDefinition>),
    /// The path exists but does not declare the method.
    MethodNotAllowed,
    /// No resource is declared at the path.
    NotFound,
}

/// Immutable lookup tables shared by every request.
///
/// # Example
///
/// ```
/// use heron_core::{codes, Resolution, ResourceDefinition, SchemaRegistry};
///
/// let registry = SchemaRegistry::builder()
///     .route("/users", "get", ResourceDefinition::new("list_users"))
///     .build()
///     .unwrap();
///
/// assert!(matches!(registry.resolve("users", "GET"), Resolution::Found(_)));
/// assert_eq!(registry.resolve("users", "DELETE"), Resolution::MethodNotAllowed);
/// assert_eq!(registry.resolve("nope", "GET"), Resolution::NotFound);
/// assert_eq!(registry.code(codes::OK).map(|c| c.http_status), Some(200));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    routes: HashMap<String, HashMap<String, Arc<ResourceDefinition>>>,
    codes: CodeTable,
    messages: MessageTable,
}

impl SchemaRegistry {
    /// Starts a programmatic registry.
    #[must_use]
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::default()
    }

    /// Builds a registry from decoded tables.
    ///
    /// Paths are normalized, methods uppercased and every resource validated.
    /// Two entries that normalize to the same pair are rejected.
    /// `codes` is layered over the built-in table.
    pub fn from_tables(
        routes: RouteTable,
        codes: CodeTable,
        messages: MessageTable,
    ) -> SchemaResult<Self> {
        let entries = routes.into_iter().flat_map(|(path, methods)| {
            methods
                .into_iter()
                .map(move |(method, resource)| (path.clone(), method, resource))
        });
        Self::from_entries(entries, codes, messages)
    }

    fn from_entries(
        entries: impl IntoIterator<Item = (String, String, ResourceDefinition)>,
        codes: CodeTable,
        messages: MessageTable,
    ) -> SchemaResult<Self> {
        let mut table: HashMap<String, HashMap<String, Arc<ResourceDefinition>>> = HashMap::new();
        for (path, method, resource) in entries {
            let path = normalize_path(&path);
            let method = method.to_ascii_uppercase();
            resource.validate(&path, &method)?;

            let methods = table.entry(path.clone()).or_default();
            if methods.contains_key(&method) {
                return Err(SchemaError::DuplicateRoute { path, method });
            }
            methods.insert(method, Arc::new(resource));
        }

        let mut merged = builtin_codes();
        merged.extend(codes);

        Ok(Self {
            routes: table,
            codes: merged,
            messages,
        })
    }

    /// Builds a registry from the three JSON documents.
    pub fn from_json(routes: &str, codes: &str, messages: &str) -> SchemaResult<Self> {
        let routes: RouteTable = serde_json::from_str(routes)
            .map_err(|e| SchemaError::invalid_document("routes", e))?;
        let codes: CodeTable =
            serde_json::from_str(codes).map_err(|e| SchemaError::invalid_document("codes", e))?;
        let messages: MessageTable = serde_json::from_str(messages)
            .map_err(|e| SchemaError::invalid_document("messages", e))?;
        Self::from_tables(routes, codes, messages)
    }

    /// Resolves a normalized path and method.
    #[must_use]
    pub fn resolve(&self, path: &str, method: &str) -> Resolution<'_> {
        let Some(methods) = self.routes.get(path) else {
            return Resolution::NotFound;
        };
        methods
            .get(&method.to_ascii_uppercase())
            .map_or(Resolution::MethodNotAllowed, Resolution::Found)
    }

    /// Returns the resource for a pair, if declared.
    #[must_use]
    pub fn resource(&self, path: &str, method: &str) -> Option<&Arc<ResourceDefinition>> {
        match self.resolve(path, method) {
            Resolution::Found(resource) => Some(resource),
            Resolution::MethodNotAllowed | Resolution::NotFound => None,
        }
    }

    /// Returns the descriptor of a code identifier.
    #[must_use]
    pub fn code(&self, id: &str) -> Option<&ResponseCode> {
        self.codes.get(id)
    }

    /// Returns the localized texts of a custom-message key.
    #[must_use]
    pub fn message(&self, key: &str) -> Option<&IndexMap<String, String>> {
        self.messages.get(key)
    }

    /// Returns the number of declared (path, method) pairs.
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    /// Returns the number of known codes, built-ins included.
    #[must_use]
    pub fn code_count(&self) -> usize {
        self.codes.len()
    }

    /// Returns the number of custom-message keys.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

/// Builder for [`SchemaRegistry`].
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    routes: Vec<(String, String, ResourceDefinition)>,
    codes: CodeTable,
    messages: MessageTable,
}

impl SchemaRegistryBuilder {
    /// Declares a resource.
    #[must_use]
    pub fn route(mut self, path: &str, method: &str, resource: ResourceDefinition) -> Self {
        self.routes
            .push((path.to_string(), method.to_string(), resource));
        self
    }

    /// Declares or overrides a response code.
    #[must_use]
    pub fn code(mut self, id: impl Into<String>, code: ResponseCode) -> Self {
        self.codes.insert(id.into(), code);
        self
    }

    /// Adds one localized text to a custom-message key.
    #[must_use]
    pub fn message(
        mut self,
        key: impl Into<String>,
        locale: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.messages
            .entry(key.into())
            .or_default()
            .insert(locale.into(), text.into());
        self
    }

    /// Validates and builds the registry.
    pub fn build(self) -> SchemaResult<SchemaRegistry> {
        SchemaRegistry::from_entries(self.routes, self.codes, self.messages)
    }
}
