//! Response codes and the built-in code table.
//!
//! Every [`Outcome`](crate::Outcome) carries a code identifier. The response
//! builder maps that identifier to a [`ResponseCode`] to pick the HTTP status
//! and the localized messages placed in the envelope.
//!
//! A fixed set of built-in codes always exists. Schema-provided tables are
//! layered on top of them, so a deployment can reword or re-status a built-in
//! code but never lose one.
//!
//! | Code | HTTP | Meaning |
//! |------|------|---------|
//! | [`OK`] | 200 | Operation succeeded |
//! | [`INTERNAL_ERROR`] | 500 | Internal error or captured panic |
//! | [`UNKNOWN_CODE`] | 501 | Result code not present in any table |
//! | [`SERIALIZATION_FAILED`] | 500 | Envelope could not be serialized |
//! | [`ROUTE_NOT_FOUND`] | 404 | No resource at this path |
//! | [`PREFLIGHT`] | 202 | CORS preflight (OPTIONS) |
//! | [`METHOD_NOT_ALLOWED`] | 405 | Path exists, method does not |
//! | [`NETWORK_DENIED`] | 403 | Requester IP rejected by policy |
//! | [`AUTH_HEADER_MISSING`] | 401 | No `Authorization` header |
//! | [`AUTH_HEADER_MALFORMED`] | 401 | `Authorization` header has one field |
//! | [`UNSUPPORTED_CONTENT_TYPE`] | 400 | Body sent while negotiating non-JSON |
//! | [`MALFORMED_BODY`] | 400 | Body is not valid JSON |
//! | [`BODY_NOT_OBJECT`] | 400 | Body JSON is not an object |
//! | [`INVALID_PARAMETERS`] | 406 | Missing or invalid parameters |
//! | [`HANDLER_UNIMPLEMENTED`] | 501 | Handler name not registered |
//! | [`VALIDATOR_UNIMPLEMENTED`] | 501 | Validator id not registered |

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Locale used for built-in messages.
pub const DEFAULT_LOCALE: &str = "en-us";

/// Success.
pub const OK: &str = "OK";
/// Internal error; also the code of a captured panic.
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
/// Fallback descriptor for codes present in no table.
pub const UNKNOWN_CODE: &str = "UNKNOWN_CODE";
/// The response envelope could not be serialized.
pub const SERIALIZATION_FAILED: &str = "SERIALIZATION_FAILED";
/// The requested path is not declared in the schema.
pub const ROUTE_NOT_FOUND: &str = "ROUTE_NOT_FOUND";
/// OPTIONS preflight short-circuit.
pub const PREFLIGHT: &str = "PREFLIGHT";
/// The path exists but does not declare the requested method.
pub const METHOD_NOT_ALLOWED: &str = "METHOD_NOT_ALLOWED";
/// The requester IP is rejected by the resource network policy.
pub const NETWORK_DENIED: &str = "NETWORK_DENIED";
/// The `Authorization` header is absent.
pub const AUTH_HEADER_MISSING: &str = "AUTH_HEADER_MISSING";
/// The `Authorization` header has fewer than two fields.
pub const AUTH_HEADER_MALFORMED: &str = "AUTH_HEADER_MALFORMED";
/// A body was sent while a non-JSON content type was negotiated.
pub const UNSUPPORTED_CONTENT_TYPE: &str = "UNSUPPORTED_CONTENT_TYPE";
/// The body is not valid JSON.
pub const MALFORMED_BODY: &str = "MALFORMED_BODY";
/// The body JSON is not an object.
pub const BODY_NOT_OBJECT: &str = "BODY_NOT_OBJECT";
/// One or more parameters are missing or invalid.
pub const INVALID_PARAMETERS: &str = "INVALID_PARAMETERS";
/// The resource handler is not registered.
pub const HANDLER_UNIMPLEMENTED: &str = "HANDLER_UNIMPLEMENTED";
/// A parameter validator is not registered.
pub const VALIDATOR_UNIMPLEMENTED: &str = "VALIDATOR_UNIMPLEMENTED";

/// Code identifier → descriptor table.
pub type CodeTable = HashMap<String, ResponseCode>;

/// HTTP status and localized messages for one result code.
///
/// Serialized as `{"http": 404, "message": {"en-us": "..."}}`.
///
/// # Example
///
/// ```
/// use heron_core::ResponseCode;
///
/// let code = ResponseCode::new(409).with_message("en-us", "Already exists");
/// assert_eq!(code.http_status, 409);
/// assert_eq!(code.message_for("en-us"), Some("Already exists"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseCode {
    /// HTTP status returned with this code.
    #[serde(rename = "http")]
    pub http_status: u16,

    /// Locale → message.
    #[serde(default)]
    pub message: IndexMap<String, String>,
}

impl ResponseCode {
    /// Creates a descriptor with no messages.
    #[must_use]
    pub fn new(http_status: u16) -> Self {
        Self {
            http_status,
            message: IndexMap::new(),
        }
    }

    /// Adds a localized message.
    #[must_use]
    pub fn with_message(mut self, locale: impl Into<String>, text: impl Into<String>) -> Self {
        self.message.insert(locale.into(), text.into());
        self
    }

    /// Returns the message for a locale.
    #[must_use]
    pub fn message_for(&self, locale: &str) -> Option<&str> {
        self.message.get(locale).map(String::as_str)
    }
}

/// Builds the built-in code table.
///
/// The registry layers schema-provided codes over this table at construction.
#[must_use]
pub fn builtin_codes() -> CodeTable {
    [
        (OK, 200, "Operation performed successfully"),
        (INTERNAL_ERROR, 500, "Internal and unknown server error"),
        (
            UNKNOWN_CODE,
            501,
            "The resource returned a code that is not configured. All resource operations are done",
        ),
        (
            SERIALIZATION_FAILED,
            500,
            "Operations performed successfully but the response could not be serialized",
        ),
        (
            ROUTE_NOT_FOUND,
            404,
            "This application is not configured to handle this endpoint",
        ),
        (
            PREFLIGHT,
            202,
            "Performing CORS validation for the OPTIONS HTTP method",
        ),
        (
            METHOD_NOT_ALLOWED,
            405,
            "This route does not support the used HTTP request method",
        ),
        (
            NETWORK_DENIED,
            403,
            "Your IP address is not allowed to call this resource",
        ),
        (
            AUTH_HEADER_MISSING,
            401,
            "The 'Authorization' header required for authenticated resources was not found",
        ),
        (
            AUTH_HEADER_MALFORMED,
            401,
            "The token at the 'Authorization' header must be prefixed by its scheme, e.g. 'Bearer'",
        ),
        (
            UNSUPPORTED_CONTENT_TYPE,
            400,
            "The 'Accept' header requested a format other than JSON, which is not supported for input",
        ),
        (MALFORMED_BODY, 400, "Input payload is not a valid JSON"),
        (BODY_NOT_OBJECT, 400, "Input payload is not a JSON object"),
        (
            INVALID_PARAMETERS,
            406,
            "Required parameters missing or invalid",
        ),
        (
            HANDLER_UNIMPLEMENTED,
            501,
            "The requested resource has no implemented function",
        ),
        (
            VALIDATOR_UNIMPLEMENTED,
            501,
            "A parameter validator declared by this resource is not implemented",
        ),
    ]
    .into_iter()
    .map(|(id, status, text)| {
        (
            id.to_string(),
            ResponseCode::new(status).with_message(DEFAULT_LOCALE, text),
        )
    })
    .collect()
}
