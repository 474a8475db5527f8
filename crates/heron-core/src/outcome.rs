//! The uniform result of every pipeline stage and callback.

use crate::codes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of a stage, hook, handler or validator.
///
/// An `Outcome` is a code identifier, an optional custom-message key and an
/// arbitrary JSON payload. Any code other than [`codes::OK`] short-circuits the
/// remaining guarded stages of the pipeline.
///
/// # Example
///
/// ```
/// use heron_core::{codes, Outcome};
/// use serde_json::json;
///
/// let ok = Outcome::success(json!({"id": 7}));
/// assert!(ok.is_ok());
///
/// let conflict = Outcome::new("USER_EXISTS").with_message("user.exists");
/// assert!(!conflict.is_ok());
/// assert_eq!(conflict.message.as_deref(), Some("user.exists"));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Outcome {
    /// Response code identifier. Empty means "not set".
    pub code: String,

    /// Key into the schema's custom message table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Payload placed in the envelope `data` field.
    #[serde(default)]
    pub data: Value,
}

impl Outcome {
    /// Creates an outcome with the given code and a null payload.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: None,
            data: Value::Null,
        }
    }

    /// Creates a successful outcome with a null payload.
    #[must_use]
    pub fn ok() -> Self {
        Self::new(codes::OK)
    }

    /// Creates a successful outcome carrying `data`.
    #[must_use]
    pub fn success(data: impl Into<Value>) -> Self {
        Self::ok().with_data(data)
    }

    /// Creates an internal-error outcome carrying `data`.
    #[must_use]
    pub fn internal_error(data: impl Into<Value>) -> Self {
        Self::new(codes::INTERNAL_ERROR).with_data(data)
    }

    /// Replaces the payload.
    #[must_use]
    pub fn with_data(mut self, data: impl Into<Value>) -> Self {
        self.data = data.into();
        self
    }

    /// Sets the custom-message key.
    #[must_use]
    pub fn with_message(mut self, key: impl Into<String>) -> Self {
        self.message = Some(key.into());
        self
    }

    /// Returns `true` if the code is the success sentinel.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == codes::OK
    }

    /// Returns `true` if no code has been set.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        self.code.is_empty()
    }

    /// Replaces an empty code with [`codes::OK`].
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.is_unset() {
            self.code = codes::OK.to_string();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_is_unset() {
        let outcome = Outcome::default();
        assert!(outcome.is_unset());
        assert!(!outcome.is_ok());
        assert_eq!(outcome.data, Value::Null);
    }

    #[test]
    fn test_normalized_fills_empty_code() {
        let outcome = Outcome::default().with_data(json!([1, 2])).normalized();
        assert!(outcome.is_ok());
        assert_eq!(outcome.data, json!([1, 2]));
    }

    #[test]
    fn test_normalized_keeps_explicit_code() {
        let outcome = Outcome::new("NOPE").normalized();
        assert_eq!(outcome.code, "NOPE");
    }

    #[test]
    fn test_internal_error() {
        let outcome = Outcome::internal_error("boom");
        assert_eq!(outcome.code, codes::INTERNAL_ERROR);
        assert_eq!(outcome.data, json!("boom"));
    }
}
