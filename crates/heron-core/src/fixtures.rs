//! Test fixtures for Heron development and testing.
//!
//! A small registry covering the common resource shapes: an open listing,
//! an authenticated endpoint, a parameter-heavy endpoint, a network-restricted
//! endpoint and an endpoint with a custom validator.
//!
//! # Example
//!
//! ```
//! use heron_core::fixtures;
//!
//! let registry = fixtures::sample_registry();
//! assert!(registry.resource("users", "GET").is_some());
//! assert!(registry.resource("secure", "POST").unwrap().authentication);
//! ```

use crate::codes::ResponseCode;
use crate::resource::{NetworkPolicy, ParamKind, ParameterSpec, ResourceDefinition};
use crate::schema::SchemaRegistry;

/// Validator identifier used by the `signup` resource.
pub const EMAIL_VALIDATOR: &str = "email";

/// Custom code returned by the `signup` email validator.
pub const INVALID_EMAIL: &str = "INVALID_EMAIL";

/// Custom-message key returned with [`INVALID_EMAIL`].
pub const INVALID_EMAIL_MESSAGE: &str = "signup.invalid_email";

/// Routes document equivalent to [`sample_registry`], for loaders.
pub const SAMPLE_ROUTES_JSON: &str = r#"{
    "/users": {
        "GET": {"function": "list_users"}
    },
    "/secure": {
        "POST": {"function": "secure_action", "authentication": true}
    },
    "/profiles": {
        "POST": {
            "function": "create_profile",
            "parameters": [
                {"name": "age", "kind": "number", "required": true},
                {"name": "color", "kind": "enum", "options": ["red", "blue"]},
                {"name": "bio", "kind": "string", "max_length": 5},
                {"name": "ref", "kind": "string", "source": "query"}
            ]
        }
    },
    "/internal": {
        "GET": {
            "function": "internal_stats",
            "network": {"default": "deny", "exceptions": ["10.0.0.0/8"]}
        }
    },
    "/signup": {
        "POST": {
            "function": "signup",
            "parameters": [
                {"name": "email", "kind": "string", "required": true, "validators": ["email"]}
            ]
        }
    }
}"#;

/// Codes document matching [`sample_registry`].
pub const SAMPLE_CODES_JSON: &str = r#"{
    "INVALID_EMAIL": {"http": 422, "message": {"en-us": "Invalid e-mail address"}}
}"#;

/// Messages document matching [`sample_registry`].
pub const SAMPLE_MESSAGES_JSON: &str = r#"{
    "signup.invalid_email": {"en-us": "Use an address like name@example.com"}
}"#;

/// Creates the sample registry.
///
/// | Path | Method | Handler | Notes |
/// |------|--------|---------|-------|
/// | `users` | GET | `list_users` | open |
/// | `secure` | POST | `secure_action` | authenticated |
/// | `profiles` | POST | `create_profile` | `age`, `color`, `bio`, `ref` (query) |
/// | `internal` | GET | `internal_stats` | deny except `10.0.0.0/8` |
/// | `signup` | POST | `signup` | `email` with the `email` validator |
#[must_use]
pub fn sample_registry() -> SchemaRegistry {
    SchemaRegistry::builder()
        .route("/users", "GET", ResourceDefinition::new("list_users"))
        .route(
            "/secure",
            "POST",
            ResourceDefinition::new("secure_action").authenticated(),
        )
        .route("/profiles", "POST", profiles_resource())
        .route(
            "/internal",
            "GET",
            ResourceDefinition::new("internal_stats")
                .network(NetworkPolicy::deny_all().except("10.0.0.0/8")),
        )
        .route(
            "/signup",
            "POST",
            ResourceDefinition::new("signup").parameter(
                ParameterSpec::new("email", ParamKind::String)
                    .required()
                    .validator(EMAIL_VALIDATOR),
            ),
        )
        .code(
            INVALID_EMAIL,
            ResponseCode::new(422).with_message("en-us", "Invalid e-mail address"),
        )
        .message(
            INVALID_EMAIL_MESSAGE,
            "en-us",
            "Use an address like name@example.com",
        )
        .build()
        .unwrap_or_default()
}

/// The `profiles` POST resource on its own.
#[must_use]
pub fn profiles_resource() -> ResourceDefinition {
    ResourceDefinition::new("create_profile")
        .parameter(ParameterSpec::new("age", ParamKind::Number).required())
        .parameter(ParameterSpec::new("color", ParamKind::Enum).options(["red", "blue"]))
        .parameter(ParameterSpec::new("bio", ParamKind::String).max_length(5))
        .parameter(ParameterSpec::new("ref", ParamKind::String).from_query())
}
