//! Transport adapters.
//!
//! An adapter turns a transport request into a [`RequestContext`] and a
//! pipeline [`Response`] back into the transport's response type:
//!
//! - method as sent
//! - path without its leading slash, the root being `index`
//! - first value of each header and query parameter
//! - caller IP, with the IPv6 loopback reported as `127.0.0.1`
//! - body bytes, base64-decoded when the event says so
//! - the request id echoed back as `x-request-id`
//!
//! Two transports are covered: `http` crate requests (used by the built-in
//! server) and API-gateway style JSON events.

use crate::error::ServerError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use heron_core::{RequestContext, RequestId};
use heron_pipeline::{Dispatcher, Response};
use http::header::{HeaderName, HeaderValue};
use http::request::Parts;
use http_body_util::Full;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Header carrying the request id in both directions.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Returns the address reported to the pipeline for a peer.
///
/// IPv4-mapped IPv6 addresses are unwrapped and `::1` becomes `127.0.0.1`.
#[must_use]
pub fn client_ip(addr: IpAddr) -> String {
    match addr.to_canonical() {
        IpAddr::V6(v6) if v6.is_loopback() => Ipv4Addr::LOCALHOST.to_string(),
        other => other.to_string(),
    }
}

/// Builds a context from the head and collected body of an HTTP request.
///
/// A valid UUID in `x-request-id` is kept as the request id; anything else
/// gets a fresh one.
#[must_use]
pub fn context_from_http(parts: &Parts, body: Bytes, remote: Option<SocketAddr>) -> RequestContext {
    let mut ctx = RequestContext::new(parts.uri.path(), parts.method.as_str()).with_body(body);

    if let Some(remote) = remote {
        ctx = ctx.with_ip(client_ip(remote.ip()));
    }

    for name in parts.headers.keys() {
        if let Some(value) = parts.headers.get(name) {
            ctx.insert_header(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
        }
    }

    if let Some(query) = parts.uri.query() {
        for (key, value) in parse_query(query) {
            ctx.insert_query(key, value);
        }
    }

    if let Some(id) = ctx.header(REQUEST_ID_HEADER).and_then(RequestId::parse) {
        ctx = ctx.with_request_id(id);
    }

    ctx
}

/// Converts a pipeline response into an HTTP response.
#[must_use]
pub fn into_http_response(response: Response, request_id: RequestId) -> http::Response<Full<Bytes>> {
    let mut http_response = http::Response::new(Full::new(response.body));
    *http_response.status_mut() =
        http::StatusCode::from_u16(response.status).unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);

    let headers = http_response.headers_mut();
    for (name, value) in response.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!(header = %name, "dropping invalid response header"),
        }
    }
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        headers.insert(REQUEST_ID_HEADER, value);
    }

    http_response
}

/// Decodes a query string, malformed pairs being skipped.
fn parse_query(query: &str) -> Vec<(String, String)> {
    match serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
        Ok(pairs) => pairs,
        Err(e) => {
            tracing::debug!(error = %e, "ignoring undecodable query string");
            Vec::new()
        }
    }
}

/// An API-gateway HTTP event (payload format 2.0).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEvent {
    /// Path as requested, with its leading slash.
    #[serde(default)]
    pub raw_path: String,

    /// Headers, already reduced to one value each.
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Query parameters, already reduced to one value each.
    #[serde(default)]
    pub query_string_parameters: HashMap<String, String>,

    /// Body text, base64 when [`is_base64_encoded`](Self::is_base64_encoded).
    #[serde(default)]
    pub body: Option<String>,

    /// Whether `body` is base64.
    #[serde(default)]
    pub is_base64_encoded: bool,

    /// Request metadata.
    #[serde(default)]
    pub request_context: GatewayRequestContext,
}

/// The `requestContext` block of a [`GatewayEvent`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayRequestContext {
    /// Gateway-assigned request id.
    #[serde(default)]
    pub request_id: String,

    /// Method and caller.
    #[serde(default)]
    pub http: GatewayHttp,
}

/// The `requestContext.http` block of a [`GatewayEvent`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayHttp {
    /// HTTP method.
    #[serde(default)]
    pub method: String,

    /// Caller IP as seen by the gateway.
    #[serde(default)]
    pub source_ip: String,
}

impl GatewayEvent {
    /// Builds a request context from the event.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::InvalidEvent` if the body is flagged as base64 but
    /// does not decode.
    pub fn into_context(self) -> Result<RequestContext, ServerError> {
        let body = match (self.body, self.is_base64_encoded) {
            (None, _) => Bytes::new(),
            (Some(text), false) => Bytes::from(text),
            (Some(text), true) => STANDARD
                .decode(text)
                .map(Bytes::from)
                .map_err(|e| ServerError::InvalidEvent(format!("body is not valid base64: {e}")))?,
        };

        let ip = self
            .request_context
            .http
            .source_ip
            .parse::<IpAddr>()
            .map_or_else(|_| self.request_context.http.source_ip.clone(), client_ip);

        let mut ctx = RequestContext::new(&self.raw_path, &self.request_context.http.method)
            .with_ip(ip)
            .with_body(body);

        if let Some(id) = RequestId::parse(&self.request_context.request_id) {
            ctx = ctx.with_request_id(id);
        }
        for (name, value) in self.headers {
            ctx.insert_header(&name, value);
        }
        for (key, value) in self.query_string_parameters {
            ctx.insert_query(key, value);
        }

        Ok(ctx)
    }
}

/// The response handed back to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    /// HTTP status.
    pub status_code: u16,

    /// Response headers.
    pub headers: HashMap<String, String>,

    /// Body text.
    pub body: String,

    /// Always `false`: envelopes are text.
    pub is_base64_encoded: bool,
}

impl GatewayResponse {
    /// Converts a pipeline response.
    #[must_use]
    pub fn from_response(response: Response, request_id: RequestId) -> Self {
        let mut headers: HashMap<String, String> = response.headers.into_iter().collect();
        headers.insert(REQUEST_ID_HEADER.to_string(), request_id.to_string());

        Self {
            status_code: response.status,
            headers,
            body: String::from_utf8_lossy(&response.body).into_owned(),
            is_base64_encoded: false,
        }
    }
}

/// Runs a gateway event through the dispatcher.
///
/// # Errors
///
/// Returns `ServerError::InvalidEvent` if the event cannot be read.
pub fn handle_gateway_event(
    dispatcher: &Dispatcher,
    event: GatewayEvent,
) -> Result<GatewayResponse, ServerError> {
    let mut ctx = event.into_context()?;
    let response = dispatcher.handle(&mut ctx);
    Ok(GatewayResponse::from_response(response, ctx.request_id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use heron_core::INDEX_PATH;
    use serde_json::json;

    fn parts(uri: &str, headers: &[(&str, &str)]) -> Parts {
        let mut builder = http::Request::builder().method("POST").uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_client_ip() {
        assert_eq!(client_ip("::1".parse().unwrap()), "127.0.0.1");
        assert_eq!(client_ip("::ffff:10.1.2.3".parse().unwrap()), "10.1.2.3");
        assert_eq!(client_ip("2001:db8::1".parse().unwrap()), "2001:db8::1");
        assert_eq!(client_ip("192.168.0.9".parse().unwrap()), "192.168.0.9");
    }

    #[test]
    fn test_context_from_http() {
        let parts = parts(
            "/profiles?ref=home&ref=other&q=a%20b",
            &[("Accept", "application/xml"), ("X-Trace", "1"), ("x-trace", "2")],
        );
        let remote: SocketAddr = "[::1]:5000".parse().unwrap();

        let ctx = context_from_http(&parts, Bytes::from_static(b"{}"), Some(remote));

        assert_eq!(ctx.path(), "profiles");
        assert_eq!(ctx.method(), "POST");
        assert_eq!(ctx.ip(), "127.0.0.1");
        assert_eq!(ctx.header("accept"), Some("application/xml"));
        assert_eq!(ctx.header("x-trace"), Some("1"));
        assert_eq!(ctx.query("ref"), Some("home"));
        assert_eq!(ctx.query("q"), Some("a b"));
        assert_eq!(ctx.body().as_ref(), b"{}");
    }

    #[test]
    fn test_root_path_is_index() {
        let ctx = context_from_http(&parts("/", &[]), Bytes::new(), None);
        assert_eq!(ctx.path(), INDEX_PATH);
    }

    #[test]
    fn test_request_id_header() {
        let id = RequestId::new();
        let ctx = context_from_http(
            &parts("/users", &[("X-Request-Id", id.to_string().as_str())]),
            Bytes::new(),
            None,
        );
        assert_eq!(ctx.request_id(), id);

        let ctx = context_from_http(
            &parts("/users", &[("X-Request-Id", "not-a-uuid")]),
            Bytes::new(),
            None,
        );
        assert_ne!(ctx.request_id().to_string(), "not-a-uuid");
    }

    #[test]
    fn test_into_http_response() {
        let response = Response {
            status: 404,
            headers: [("Content-Type".to_string(), "application/xml".to_string())]
                .into_iter()
                .collect(),
            body: Bytes::from_static(b"<response/>"),
        };
        let id = RequestId::new();

        let http_response = into_http_response(response, id);
        assert_eq!(http_response.status(), http::StatusCode::NOT_FOUND);
        assert_eq!(http_response.headers()["content-type"], "application/xml");
        assert_eq!(
            http_response.headers()[REQUEST_ID_HEADER],
            id.to_string().as_str()
        );
    }

    #[test]
    fn test_gateway_event_decoding() {
        let event: GatewayEvent = serde_json::from_value(json!({
            "rawPath": "/",
            "headers": {"accept": "application/json"},
            "queryStringParameters": {"page": "2"},
            "body": "eyJhIjogMX0=",
            "isBase64Encoded": true,
            "requestContext": {
                "requestId": "abc",
                "http": {"method": "post", "sourceIp": "::1"}
            }
        }))
        .unwrap();

        let ctx = event.into_context().unwrap();
        assert_eq!(ctx.path(), INDEX_PATH);
        assert_eq!(ctx.method(), "POST");
        assert_eq!(ctx.ip(), "127.0.0.1");
        assert_eq!(ctx.query("page"), Some("2"));
        assert_eq!(ctx.body().as_ref(), br#"{"a": 1}"#);
    }

    #[test]
    fn test_gateway_invalid_base64() {
        let event = GatewayEvent {
            raw_path: "/users".to_string(),
            body: Some("***".to_string()),
            is_base64_encoded: true,
            ..GatewayEvent::default()
        };
        assert!(matches!(
            event.into_context(),
            Err(ServerError::InvalidEvent(_))
        ));
    }

    #[test]
    fn test_gateway_response_shape() {
        let response = Response {
            status: 200,
            headers: Default::default(),
            body: Bytes::from_static(b"{}"),
        };
        let id = RequestId::new();
        let value = serde_json::to_value(GatewayResponse::from_response(response, id)).unwrap();

        assert_eq!(value["statusCode"], json!(200));
        assert_eq!(value["body"], json!("{}"));
        assert_eq!(value["isBase64Encoded"], json!(false));
        assert_eq!(value["headers"][REQUEST_ID_HEADER], json!(id.to_string()));
    }
}
