//! Response envelope assembly.
//!
//! Every request ends here, whatever stage stopped it. The builder maps the
//! outcome code to a [`ResponseCode`] (schema table, then built-ins, then the
//! `UNKNOWN_CODE` fallback) and wraps the payload in the envelope:
//!
//! ```json
//! {
//!   "meta": {
//!     "id": "0190b6b2-...",
//!     "time": "2024-07-01T12:00:00.000Z",
//!     "code": "OK",
//!     "message": {"en-us": "Operation performed successfully"},
//!     "custom_message": {"en-us": "..."}
//!   },
//!   "data": {}
//! }
//! ```
//!
//! XML responses carry the same structure under a `<response>` root, indented
//! with three spaces.

use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use heron_core::codes::{self, builtin_codes};
use heron_core::{ContentType, RequestContext, ResponseCode, SchemaRegistry};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// `Cache-Control` value sent with every envelope.
pub const CACHE_CONTROL: &str = "max-age=0,private,must-revalidate,no-cache";

/// `Access-Control-Max-Age` value sent with every envelope.
pub const CORS_MAX_AGE: &str = "86400";

/// Root element of XML envelopes.
pub const XML_ROOT: &str = "response";

/// Errors raised while encoding an envelope.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// JSON encoding failed.
    #[error("failed to encode JSON envelope: {0}")]
    Json(#[from] serde_json::Error),

    /// XML encoding failed.
    #[error("failed to encode XML envelope: {0}")]
    Xml(String),
}

/// A transport-agnostic response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status.
    pub status: u16,

    /// Headers, in insertion order.
    pub headers: IndexMap<String, String>,

    /// Encoded envelope.
    pub body: Bytes,
}

impl Response {
    /// Looks up a header case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Decodes a JSON body.
    ///
    /// Returns `None` for empty or non-JSON bodies.
    #[must_use]
    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    meta: Meta<'a>,
    data: &'a Value,
}

#[derive(Serialize)]
struct Meta<'a> {
    id: String,
    time: String,
    code: &'a str,
    message: &'a IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_message: Option<&'a IndexMap<String, String>>,
}

/// Builds envelopes from finished request contexts.
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    registry: Arc<SchemaRegistry>,
    fallback: ResponseCode,
}

impl ResponseBuilder {
    /// Creates a builder over a registry.
    #[must_use]
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        let fallback = builtin_codes()
            .remove(codes::UNKNOWN_CODE)
            .unwrap_or_else(|| ResponseCode::new(501));
        Self { registry, fallback }
    }

    /// Returns the descriptor used for a code identifier.
    #[must_use]
    pub fn descriptor(&self, code: &str) -> &ResponseCode {
        self.registry
            .code(code)
            .or_else(|| self.registry.code(codes::UNKNOWN_CODE))
            .unwrap_or(&self.fallback)
    }

    /// Assembles the response for a context.
    ///
    /// Never fails: an encoding error is logged and produces the
    /// `SERIALIZATION_FAILED` status with no headers and an empty body.
    #[must_use]
    pub fn build(&self, ctx: &RequestContext) -> Response {
        let outcome = ctx.outcome();
        let descriptor = self.descriptor(&outcome.code);
        let content_type = ctx.negotiated_content_type();

        let envelope = Envelope {
            meta: Meta {
                id: ctx.request_id().to_string(),
                time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                code: &outcome.code,
                message: &descriptor.message,
                custom_message: outcome
                    .message
                    .as_deref()
                    .and_then(|key| self.registry.message(key)),
            },
            data: &outcome.data,
        };

        match encode(&envelope, content_type) {
            Ok(body) => Response {
                status: descriptor.http_status,
                headers: envelope_headers(content_type),
                body,
            },
            Err(e) => {
                tracing::error!(
                    request_id = %ctx.request_id(),
                    code = %outcome.code,
                    error = %e,
                    "failed to serialize response envelope"
                );
                Response {
                    status: self.descriptor(codes::SERIALIZATION_FAILED).http_status,
                    headers: IndexMap::new(),
                    body: Bytes::new(),
                }
            }
        }
    }
}

fn envelope_headers(content_type: ContentType) -> IndexMap<String, String> {
    [
        ("Content-Type", content_type.mime()),
        ("Cache-Control", CACHE_CONTROL),
        ("Access-Control-Allow-Origin", "*"),
        ("Access-Control-Allow-Methods", "*"),
        ("Access-Control-Allow-Headers", "*"),
        ("Access-Control-Max-Age", CORS_MAX_AGE),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect()
}

fn encode(envelope: &Envelope<'_>, content_type: ContentType) -> Result<Bytes, ResponseError> {
    match content_type {
        ContentType::Json => Ok(Bytes::from(serde_json::to_vec(envelope)?)),
        ContentType::Xml => {
            let mut xml = String::new();
            let mut serializer = quick_xml::se::Serializer::with_root(&mut xml, Some(XML_ROOT))
                .map_err(|e| ResponseError::Xml(e.to_string()))?;
            serializer.indent(' ', 3);
            envelope
                .serialize(serializer)
                .map_err(|e| ResponseError::Xml(e.to_string()))?;
            Ok(Bytes::from(xml))
        }
    }
}
