//! Schema construction errors.
//!
//! Request-path failures are never Rust errors: they travel as
//! [`Outcome`](crate::Outcome) codes. [`SchemaError`] only covers building the
//! registry at startup, where a bad document must stop the process.

use thiserror::Error;

/// Result type alias using [`SchemaError`].
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while building a [`SchemaRegistry`](crate::SchemaRegistry).
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A schema document is not valid JSON for its expected shape.
    #[error("invalid {document} document: {source}")]
    InvalidDocument {
        /// Which document failed ("routes", "codes" or "messages").
        document: &'static str,
        /// Underlying decoder error.
        #[source]
        source: serde_json::Error,
    },

    /// A resource declares no handler function.
    #[error("resource {method} {path} declares an empty handler name")]
    EmptyHandler {
        /// Resource path.
        path: String,
        /// Resource method.
        method: String,
    },

    /// Two parameters of one resource share a name.
    #[error("resource {method} {path} declares parameter '{parameter}' twice")]
    DuplicateParameter {
        /// Resource path.
        path: String,
        /// Resource method.
        method: String,
        /// Duplicated parameter name.
        parameter: String,
    },

    /// An enum parameter has no options.
    #[error("enum parameter '{parameter}' of {method} {path} has no options")]
    EmptyEnumOptions {
        /// Resource path.
        path: String,
        /// Resource method.
        method: String,
        /// Parameter name.
        parameter: String,
    },

    /// A non-enum parameter lists options.
    #[error("{kind} parameter '{parameter}' of {method} {path} lists options; only enum parameters may")]
    UnexpectedOptions {
        /// Resource path.
        path: String,
        /// Resource method.
        method: String,
        /// Parameter name.
        parameter: String,
        /// Declared kind.
        kind: crate::ParamKind,
    },

    /// Two route entries resolve to the same (path, method) pair.
    #[error("resource {method} {path} is declared more than once")]
    DuplicateRoute {
        /// Normalized path.
        path: String,
        /// Uppercased method.
        method: String,
    },
}

impl SchemaError {
    /// Wraps a decoder error for the named document.
    #[must_use]
    pub fn invalid_document(document: &'static str, source: serde_json::Error) -> Self {
        Self::InvalidDocument { document, source }
    }
}
