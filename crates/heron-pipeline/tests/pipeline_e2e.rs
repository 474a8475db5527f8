//! End-to-end dispatcher tests.
//!
//! Each test runs a full request through every stage against the sample
//! registry:
//!
//! 1. Negotiation
//! 2. Resolution
//! 3. Network
//! 4. Token extraction
//! 5. Authentication
//! 6. Payload
//! 7. Pre-execution
//! 8. Execution
//! 9. Post-execution
//! 10. Response

use heron_core::{codes, fixtures, Outcome, RequestContext, ResourceDefinition, SchemaRegistry};
use heron_pipeline::{Backend, Dispatcher, Response};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Records every hook call and accepts only the token "valid-token".
#[derive(Default)]
struct RecordingBackend {
    calls: Mutex<Vec<&'static str>>,
}

impl RecordingBackend {
    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

impl Backend for RecordingBackend {
    fn authorize_user(&self, ctx: &mut RequestContext) -> Outcome {
        self.calls.lock().unwrap().push("authorize_user");
        if ctx.token() == Some("valid-token") {
            Outcome::ok()
        } else {
            Outcome::new("TOKEN_REJECTED")
        }
    }

    fn before_handler(&self, ctx: &mut RequestContext) -> Outcome {
        self.calls.lock().unwrap().push("before_handler");
        ctx.outcome().clone()
    }

    fn after_handler(&self, ctx: &mut RequestContext) -> Outcome {
        self.calls.lock().unwrap().push("after_handler");
        ctx.outcome().clone()
    }
}

struct Harness {
    dispatcher: Dispatcher,
    backend: Arc<RecordingBackend>,
    handler_calls: Arc<AtomicUsize>,
}

impl Harness {
    fn new() -> Self {
        let backend = Arc::new(RecordingBackend::default());
        let handler_calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&handler_calls);
        let secure_counter = Arc::clone(&handler_calls);

        let dispatcher = Dispatcher::builder(Arc::new(fixtures::sample_registry()))
            .shared_backend(backend.clone())
            .handler("list_users", move |_ctx| {
                counter.fetch_add(1, Ordering::SeqCst);
                Outcome::success(json!([{"id": 1, "name": "ada"}]))
            })
            .handler("secure_action", move |ctx| {
                secure_counter.fetch_add(1, Ordering::SeqCst);
                Outcome::success(json!({"token": ctx.token()}))
            })
            .handler("create_profile", |ctx| {
                Outcome::success(Value::Object(ctx.parameters().clone()))
            })
            .handler("internal_stats", |_ctx| panic!("stats backend offline"))
            .validator(fixtures::EMAIL_VALIDATOR, |value, _ctx| {
                if value.as_str().is_some_and(|s| s.contains('@')) {
                    Outcome::ok()
                } else {
                    Outcome::new(fixtures::INVALID_EMAIL)
                        .with_message(fixtures::INVALID_EMAIL_MESSAGE)
                        .with_data("no @ in address")
                }
            })
            .build();

        Self {
            dispatcher,
            backend,
            handler_calls,
        }
    }

    fn handle(&self, mut ctx: RequestContext) -> (RequestContext, Response) {
        let response = self.dispatcher.handle(&mut ctx);
        (ctx, response)
    }

    fn handler_calls(&self) -> usize {
        self.handler_calls.load(Ordering::SeqCst)
    }
}

fn meta_code(response: &Response) -> String {
    response.json().unwrap()["meta"]["code"]
        .as_str()
        .unwrap()
        .to_string()
}

#[test]
fn test_open_resource_invokes_handler() {
    let harness = Harness::new();
    let (_, response) = harness.handle(RequestContext::new("/users", "GET"));

    assert_eq!(response.status, 200);
    assert_eq!(harness.handler_calls(), 1);
    assert_eq!(
        harness.backend.calls(),
        vec!["before_handler", "after_handler"]
    );

    let body = response.json().unwrap();
    assert_eq!(body["meta"]["code"], json!(codes::OK));
    assert_eq!(body["data"][0]["name"], json!("ada"));
}

#[test]
fn test_unknown_route() {
    let harness = Harness::new();
    let (ctx, response) = harness.handle(RequestContext::new("/missing", "GET"));

    assert_eq!(ctx.outcome().code, codes::ROUTE_NOT_FOUND);
    assert_eq!(response.status, 404);
    assert_eq!(meta_code(&response), codes::ROUTE_NOT_FOUND);
    assert!(harness.backend.calls().is_empty());
}

#[test]
fn test_method_not_allowed() {
    let harness = Harness::new();
    let (_, response) = harness.handle(RequestContext::new("/users", "DELETE"));
    assert_eq!(response.status, 405);
    assert_eq!(harness.handler_calls(), 0);
}

#[test]
fn test_preflight_short_circuits_before_auth() {
    let harness = Harness::new();
    let (ctx, response) = harness.handle(RequestContext::new("/secure", "OPTIONS"));

    assert_eq!(ctx.outcome().code, codes::PREFLIGHT);
    assert_eq!(response.status, 202);
    assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
    assert!(harness.backend.calls().is_empty());
    assert_eq!(ctx.token(), None);
}

#[test]
fn test_preflight_on_declared_options_resource() {
    let registry = SchemaRegistry::builder()
        .route(
            "/secure",
            "OPTIONS",
            ResourceDefinition::new("secure_options").authenticated(),
        )
        .build()
        .unwrap();
    let backend = Arc::new(RecordingBackend::default());
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let dispatcher = Dispatcher::builder(Arc::new(registry))
        .shared_backend(backend.clone())
        .handler("secure_options", move |_ctx| {
            counter.fetch_add(1, Ordering::SeqCst);
            Outcome::ok()
        })
        .build();

    let mut ctx = RequestContext::new("/secure", "OPTIONS");
    let response = dispatcher.handle(&mut ctx);

    assert_eq!(ctx.outcome().code, codes::PREFLIGHT);
    assert_eq!(response.status, 202);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(backend.calls().is_empty());
}

#[test]
fn test_network_policy() {
    let harness = Harness::new();

    let (_, denied) = harness.handle(RequestContext::new("/internal", "GET").with_ip("8.8.8.8"));
    assert_eq!(denied.status, 403);
    assert_eq!(meta_code(&denied), codes::NETWORK_DENIED);

    // Allowed through the exception; the handler then panics.
    let (ctx, allowed) =
        harness.handle(RequestContext::new("/internal", "GET").with_ip("10.1.2.3"));
    assert_eq!(ctx.outcome().code, codes::INTERNAL_ERROR);
    assert_eq!(allowed.status, 500);
}

#[test]
fn test_handler_panic_still_produces_envelope() {
    let harness = Harness::new();
    let (_, response) =
        harness.handle(RequestContext::new("/internal", "GET").with_ip("10.0.0.1"));

    let body = response.json().unwrap();
    assert_eq!(body["meta"]["code"], json!(codes::INTERNAL_ERROR));
    assert_eq!(body["data"], json!("stats backend offline"));
    // The post-execution hook is guarded and does not run after a panic.
    assert_eq!(harness.backend.calls(), vec!["before_handler"]);
}

#[test]
fn test_auth_header_missing() {
    let harness = Harness::new();
    let (_, response) = harness.handle(RequestContext::new("/secure", "POST"));

    assert_eq!(response.status, 401);
    assert_eq!(meta_code(&response), codes::AUTH_HEADER_MISSING);
    assert_eq!(harness.handler_calls(), 0);
    assert!(harness.backend.calls().is_empty());
}

#[test]
fn test_auth_header_malformed() {
    let harness = Harness::new();
    let (_, response) = harness.handle(
        RequestContext::new("/secure", "POST").with_header("Authorization", "valid-token"),
    );

    assert_eq!(response.status, 401);
    assert_eq!(meta_code(&response), codes::AUTH_HEADER_MALFORMED);
    assert!(harness.backend.calls().is_empty());
}

#[test]
fn test_blank_auth_header_is_malformed() {
    let harness = Harness::new();
    let (_, response) =
        harness.handle(RequestContext::new("/secure", "POST").with_header("Authorization", ""));

    assert_eq!(response.status, 401);
    assert_eq!(meta_code(&response), codes::AUTH_HEADER_MALFORMED);
    assert!(harness.backend.calls().is_empty());
}

#[test]
fn test_authorized_request() {
    let harness = Harness::new();
    let (ctx, response) = harness.handle(
        RequestContext::new("/secure", "POST").with_header("authorization", "Bearer valid-token"),
    );

    assert_eq!(ctx.token(), Some("valid-token"));
    assert_eq!(response.status, 200);
    assert_eq!(response.json().unwrap()["data"]["token"], json!("valid-token"));
    assert_eq!(
        harness.backend.calls(),
        vec!["authorize_user", "before_handler", "after_handler"]
    );
}

#[test]
fn test_rejected_token_skips_handler() {
    let harness = Harness::new();
    let (_, response) = harness.handle(
        RequestContext::new("/secure", "POST").with_header("Authorization", "Bearer nope"),
    );

    // Not in any code table: falls back to the unknown-code descriptor.
    assert_eq!(response.status, 501);
    assert_eq!(meta_code(&response), "TOKEN_REJECTED");
    assert_eq!(harness.handler_calls(), 0);
    assert_eq!(harness.backend.calls(), vec!["authorize_user"]);
}

#[test]
fn test_parameter_validation_collects_all_failures() {
    let harness = Harness::new();
    let (_, response) = harness.handle(
        RequestContext::new("/profiles", "POST")
            .with_query("ref", "home")
            .with_body(r#"{"age": "20", "color": "green", "bio": "hello!"}"#),
    );

    assert_eq!(response.status, 406);
    let body = response.json().unwrap();
    assert_eq!(body["meta"]["code"], json!(codes::INVALID_PARAMETERS));

    let invalid: Vec<_> = body["data"]["invalid"]
        .as_array()
        .unwrap()
        .iter()
        .map(|spec| spec["name"].clone())
        .collect();
    assert_eq!(invalid, vec![json!("age"), json!("color"), json!("bio")]);
    assert_eq!(body["data"]["missing"], json!([]));
}

#[test]
fn test_empty_body_reports_missing() {
    let harness = Harness::new();
    let (_, response) = harness.handle(RequestContext::new("/profiles", "POST").with_body("{}"));

    let body = response.json().unwrap();
    assert_eq!(body["data"]["missing"][0]["name"], json!("age"));
    assert_eq!(body["data"]["missing"].as_array().unwrap().len(), 4);
}

#[test]
fn test_valid_parameters_reach_handler() {
    let harness = Harness::new();
    let (_, response) = harness.handle(
        RequestContext::new("/profiles", "POST")
            .with_query("ref", "home")
            .with_body(r#"{"age": 20, "color": "red", "bio": "hello"}"#),
    );

    assert_eq!(response.status, 200);
    assert_eq!(
        response.json().unwrap()["data"],
        json!({"age": 20, "color": "red", "bio": "hello", "ref": "home"})
    );
}

#[test]
fn test_malformed_body() {
    let harness = Harness::new();
    let (_, response) =
        harness.handle(RequestContext::new("/profiles", "POST").with_body("{\"age\": "));
    assert_eq!(response.status, 400);
    assert_eq!(meta_code(&response), codes::MALFORMED_BODY);
}

#[test]
fn test_body_not_object() {
    let harness = Harness::new();
    let (_, response) = harness.handle(RequestContext::new("/profiles", "POST").with_body("[1]"));
    assert_eq!(response.status, 400);
    assert_eq!(meta_code(&response), codes::BODY_NOT_OBJECT);
}

#[test]
fn test_xml_negotiation_rejects_json_body() {
    let harness = Harness::new();
    let (_, response) = harness.handle(
        RequestContext::new("/profiles", "POST")
            .with_header("Accept", "application/xml")
            .with_body(r#"{"age": 20}"#),
    );

    assert_eq!(response.status, 400);
    assert_eq!(response.header("content-type"), Some("application/xml"));
    let xml = std::str::from_utf8(&response.body).unwrap();
    assert!(xml.contains("<code>UNSUPPORTED_CONTENT_TYPE</code>"), "{xml}");
}

#[test]
fn test_custom_validator_failure() {
    let harness = Harness::new();
    let (_, response) =
        harness.handle(RequestContext::new("/signup", "POST").with_body(r#"{"email": "ada"}"#));

    assert_eq!(response.status, 422);
    let body = response.json().unwrap();
    assert_eq!(body["meta"]["code"], json!(fixtures::INVALID_EMAIL));
    assert_eq!(
        body["meta"]["custom_message"]["en-us"],
        json!("Use an address like name@example.com")
    );
    assert_eq!(body["data"]["parameter"]["name"], json!("email"));
    assert_eq!(body["data"]["input"], json!("ada"));
    assert_eq!(body["data"]["error"], json!("no @ in address"));
}

#[test]
fn test_unregistered_handler() {
    let harness = Harness::new();
    let (_, response) = harness.handle(
        RequestContext::new("/signup", "POST").with_body(r#"{"email": "ada@example.com"}"#),
    );

    assert_eq!(response.status, 501);
    let body = response.json().unwrap();
    assert_eq!(body["meta"]["code"], json!(codes::HANDLER_UNIMPLEMENTED));
    assert_eq!(body["data"], json!("signup"));
}

#[test]
fn test_xml_response() {
    let harness = Harness::new();
    let (_, response) = harness
        .handle(RequestContext::new("/users", "GET").with_header("Accept", "application/xml"));

    assert_eq!(response.status, 200);
    assert_eq!(response.header("Content-Type"), Some("application/xml"));
    let xml = std::str::from_utf8(&response.body).unwrap();
    assert!(xml.starts_with("<response>"), "{xml}");
    assert!(xml.contains("\n   <meta>"), "{xml}");
}

#[test]
fn test_json_is_default() {
    let harness = Harness::new();
    let (_, response) = harness
        .handle(RequestContext::new("/users", "GET").with_header("Accept", "text/html"));
    assert_eq!(
        response.header("Content-Type"),
        Some("application/json; charset=utf-8")
    );
    assert!(response.json().is_some());
}

#[test]
fn test_panicking_hook_is_recovered() {
    struct ExplodingBackend;

    impl Backend for ExplodingBackend {
        fn authorize_user(&self, _ctx: &mut RequestContext) -> Outcome {
            Outcome::ok()
        }

        fn before_handler(&self, _ctx: &mut RequestContext) -> Outcome {
            panic!("hook exploded")
        }
    }

    let dispatcher = Dispatcher::builder(Arc::new(fixtures::sample_registry()))
        .backend(ExplodingBackend)
        .handler("list_users", |_ctx| Outcome::ok())
        .build();

    let mut ctx = RequestContext::new("/users", "GET");
    let response = dispatcher.handle(&mut ctx);

    assert_eq!(response.status, 500);
    assert_eq!(ctx.outcome().code, codes::INTERNAL_ERROR);
    assert_eq!(response.json().unwrap()["data"], json!("hook exploded"));
}

#[test]
fn test_request_id_in_envelope() {
    let harness = Harness::new();
    let ctx = RequestContext::new("/users", "GET");
    let id = ctx.request_id();
    let (_, response) = harness.handle(ctx);
    assert_eq!(
        response.json().unwrap()["meta"]["id"],
        json!(id.to_string())
    );
}
