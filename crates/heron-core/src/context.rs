//! Request context types.
//!
//! The [`RequestContext`] is the mutable record of one request evaluation. A
//! transport adapter fills in the request side, the dispatcher stages enrich
//! it (content type, token, resource, parameters) and every stage reports its
//! result through [`RequestContext::set_outcome`].

use crate::outcome::Outcome;
use crate::resource::ResourceDefinition;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Path used for requests to the root (`/`).
pub const INDEX_PATH: &str = "index";

/// Normalizes a transport path into a schema path.
///
/// The leading slash is stripped and the root maps to [`INDEX_PATH`].
///
/// ```
/// use heron_core::normalize_path;
///
/// assert_eq!(normalize_path("/users"), "users");
/// assert_eq!(normalize_path("/"), "index");
/// assert_eq!(normalize_path("v1/items"), "v1/items");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        INDEX_PATH.to_string()
    } else {
        trimmed.to_string()
    }
}

/// A unique identifier for each request, using UUID v7.
///
/// # Example
///
/// ```
/// use heron_core::RequestId;
///
/// let id = RequestId::new();
/// assert_eq!(id.to_string().len(), 36);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new time-ordered request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parses a request ID supplied by a client or an upstream proxy.
    ///
    /// Returns `None` when the value is not a UUID.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim()).ok().map(Self)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Negotiated response format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// `application/json; charset=utf-8`
    #[default]
    Json,
    /// `application/xml`
    Xml,
}

impl ContentType {
    /// Returns the `Content-Type` header value for this format.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Json => "application/json; charset=utf-8",
            Self::Xml => "application/xml",
        }
    }
}

/// Per-request state that flows through the dispatcher.
///
/// Header keys are stored lowercase and looked up case-insensitively. Both
/// headers and query parameters keep the first value inserted for a key.
///
/// # Example
///
/// ```
/// use heron_core::RequestContext;
///
/// let ctx = RequestContext::new("/users", "get")
///     .with_ip("10.0.0.7")
///     .with_header("Accept", "application/xml")
///     .with_header("accept", "application/json")
///     .with_query("page", "2");
///
/// assert_eq!(ctx.path(), "users");
/// assert_eq!(ctx.method(), "GET");
/// assert_eq!(ctx.header("ACCEPT"), Some("application/xml"));
/// assert_eq!(ctx.query("page"), Some("2"));
/// assert!(ctx.is_successful());
/// ```
pub struct RequestContext {
    request_id: RequestId,
    ip: String,
    path: String,
    method: String,
    headers: HashMap<String, String>,
    query: HashMap<String, String>,
    body: Bytes,
    content_type: Option<ContentType>,
    token: Option<String>,
    resource: Option<Arc<ResourceDefinition>>,
    parameters: Map<String, Value>,
    outcome: Outcome,
    started_at: Instant,

    /// Type-erased data attached by hooks (resolved users, sessions, ...).
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl RequestContext {
    /// Creates a context for `method` on `path`.
    ///
    /// The path is normalized with [`normalize_path`] and the method is
    /// uppercased. The current outcome starts as success.
    #[must_use]
    pub fn new(path: &str, method: &str) -> Self {
        Self {
            request_id: RequestId::new(),
            ip: String::new(),
            path: normalize_path(path),
            method: method.to_ascii_uppercase(),
            headers: HashMap::new(),
            query: HashMap::new(),
            body: Bytes::new(),
            content_type: None,
            token: None,
            resource: None,
            parameters: Map::new(),
            outcome: Outcome::ok(),
            started_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Sets the requester IP.
    #[must_use]
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = ip.into();
        self
    }

    /// Adds a header unless one with the same name is already present.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert_header(name, value);
        self
    }

    /// Adds a query parameter unless one with the same key is already present.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_query(key, value);
        self
    }

    /// Sets the raw body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Replaces the generated request ID.
    #[must_use]
    pub fn with_request_id(mut self, id: RequestId) -> Self {
        self.request_id = id;
        self
    }

    /// Presets the response content type, bypassing negotiation.
    #[must_use]
    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    /// Inserts a header. The first value for a name wins.
    pub fn insert_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers
            .entry(name.to_ascii_lowercase())
            .or_insert_with(|| value.into());
    }

    /// Inserts a query parameter. The first value for a key wins.
    pub fn insert_query(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.entry(key.into()).or_insert_with(|| value.into());
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the requester IP as received from the transport.
    #[must_use]
    pub fn ip(&self) -> &str {
        &self.ip
    }

    /// Returns the normalized path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the uppercase method.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Looks up a header case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns all headers, keyed by lowercase name.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Looks up a query parameter.
    #[must_use]
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Returns the query map.
    #[must_use]
    pub fn query_map(&self) -> &HashMap<String, String> {
        &self.query
    }

    /// Returns the raw body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the content type chosen so far, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<ContentType> {
        self.content_type
    }

    /// Returns the content type the response will use.
    #[must_use]
    pub fn negotiated_content_type(&self) -> ContentType {
        self.content_type.unwrap_or_default()
    }

    /// Sets the response content type.
    pub fn set_content_type(&mut self, content_type: ContentType) {
        self.content_type = Some(content_type);
    }

    /// Returns the bearer token extracted from `Authorization`.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Sets the bearer token.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Returns the resolved resource definition.
    #[must_use]
    pub fn resource(&self) -> Option<&Arc<ResourceDefinition>> {
        self.resource.as_ref()
    }

    /// Sets the resolved resource definition.
    pub fn set_resource(&mut self, resource: Arc<ResourceDefinition>) {
        self.resource = Some(resource);
    }

    /// Returns the validated parameters.
    #[must_use]
    pub fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }

    /// Returns one validated parameter.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    /// Replaces the validated parameter map.
    pub fn set_parameters(&mut self, parameters: Map<String, Value>) {
        self.parameters = parameters;
    }

    /// Returns the current outcome.
    #[must_use]
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Replaces the current outcome.
    pub fn set_outcome(&mut self, outcome: Outcome) {
        self.outcome = outcome;
    }

    /// Takes the current outcome, leaving an unset one behind.
    pub fn take_outcome(&mut self) -> Outcome {
        std::mem::take(&mut self.outcome)
    }

    /// Returns `true` while the current outcome is success.
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Returns the time elapsed since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Stores a typed extension value.
    ///
    /// # Example
    ///
    /// ```
    /// use heron_core::RequestContext;
    ///
    /// struct User {
    ///     id: u64,
    /// }
    ///
    /// let mut ctx = RequestContext::new("/me", "GET");
    /// ctx.set_extension(User { id: 42 });
    /// assert_eq!(ctx.get_extension::<User>().map(|u| u.id), Some(42));
    /// ```
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Returns `true` if an extension of type `T` is stored.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("ip", &self.ip)
            .field("path", &self.path)
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("query", &self.query)
            .field("body_len", &self.body.len())
            .field("content_type", &self.content_type)
            .field("has_token", &self.token.is_some())
            .field("resource", &self.resource.as_ref().map(|r| &r.handler))
            .field("outcome", &self.outcome)
            .field("extensions", &self.extensions.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/"), INDEX_PATH);
        assert_eq!(normalize_path(""), INDEX_PATH);
        assert_eq!(normalize_path("/a/b"), "a/b");
        assert_eq!(normalize_path("//a"), "/a");
    }

    #[test]
    fn test_request_id_parse() {
        let id = RequestId::new();
        assert_eq!(RequestId::parse(&id.to_string()), Some(id));
        assert_eq!(RequestId::parse("not-a-uuid"), None);
    }

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn test_headers_first_wins_case_insensitive() {
        let mut ctx = RequestContext::new("/x", "post");
        ctx.insert_header("Authorization", "Bearer one");
        ctx.insert_header("AUTHORIZATION", "Bearer two");

        assert_eq!(ctx.header("authorization"), Some("Bearer one"));
        assert_eq!(ctx.headers().len(), 1);
    }

    #[test]
    fn test_query_first_wins() {
        let ctx = RequestContext::new("/x", "GET")
            .with_query("q", "a")
            .with_query("q", "b");
        assert_eq!(ctx.query("q"), Some("a"));
    }

    #[test]
    fn test_content_type_defaults_to_json() {
        let mut ctx = RequestContext::new("/x", "GET");
        assert_eq!(ctx.content_type(), None);
        assert_eq!(ctx.negotiated_content_type(), ContentType::Json);

        ctx.set_content_type(ContentType::Xml);
        assert_eq!(ctx.negotiated_content_type(), ContentType::Xml);
        assert_eq!(ContentType::Xml.mime(), "application/xml");
    }

    #[test]
    fn test_outcome_tracking() {
        let mut ctx = RequestContext::new("/x", "GET");
        assert!(ctx.is_successful());

        ctx.set_outcome(Outcome::new("NOPE"));
        assert!(!ctx.is_successful());

        let taken = ctx.take_outcome();
        assert_eq!(taken.code, "NOPE");
        assert!(ctx.outcome().is_unset());
    }

    #[test]
    fn test_extensions() {
        #[derive(Debug, PartialEq)]
        struct Session(&'static str);

        let mut ctx = RequestContext::new("/x", "GET");
        assert!(!ctx.has_extension::<Session>());

        ctx.set_extension(Session("abc"));
        assert!(ctx.has_extension::<Session>());
        assert_eq!(ctx.get_extension::<Session>(), Some(&Session("abc")));

        assert_eq!(ctx.remove_extension::<Session>(), Some(Session("abc")));
        assert!(!ctx.has_extension::<Session>());
    }
}
