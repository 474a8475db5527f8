//! Payload parsing and parameter validation.

use crate::registry::ValidatorRegistry;
use crate::stage::{PipelineStage, Stage};
use crate::validation::{parse_body, run_validators, validate_parameters};
use heron_core::RequestContext;
use std::sync::Arc;

/// Stage 6: validates the declared parameters of the resolved resource.
///
/// Skipped entirely for resources without parameters, so their bodies are
/// never parsed.
#[derive(Debug, Clone, Default)]
pub struct PayloadValidation {
    validators: ValidatorRegistry,
}

impl PayloadValidation {
    /// Creates the stage with the custom validators.
    #[must_use]
    pub fn new(validators: ValidatorRegistry) -> Self {
        Self { validators }
    }
}

impl PipelineStage for PayloadValidation {
    fn stage(&self) -> Stage {
        Stage::Payload
    }

    fn process(&self, ctx: &mut RequestContext) {
        let Some(resource) = ctx.resource().map(Arc::clone) else {
            return;
        };
        if resource.parameters.is_empty() {
            return;
        }

        let body = match parse_body(ctx) {
            Ok(body) => body,
            Err(outcome) => {
                ctx.set_outcome(outcome);
                return;
            }
        };

        match validate_parameters(&resource.parameters, ctx.query_map(), body.as_ref()) {
            Ok(parameters) => ctx.set_parameters(parameters),
            Err(outcome) => {
                ctx.set_outcome(outcome);
                return;
            }
        }

        if let Err(outcome) = run_validators(&resource.parameters, ctx, &self.validators) {
            ctx.set_outcome(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heron_core::{codes, fixtures, Outcome, ResourceDefinition};
    use serde_json::json;

    fn profile(body: &str) -> RequestContext {
        let mut ctx = RequestContext::new("/profiles", "POST")
            .with_query("ref", "home")
            .with_body(body.to_string());
        ctx.set_resource(Arc::new(fixtures::profiles_resource()));
        PayloadValidation::default().process(&mut ctx);
        ctx
    }

    #[test]
    fn test_valid_payload_populates_parameters() {
        let ctx = profile(r#"{"age": 30, "color": "blue", "bio": "hey"}"#);
        assert!(ctx.is_successful(), "{:?}", ctx.outcome());
        assert_eq!(ctx.parameter("age"), Some(&json!(30)));
        assert_eq!(ctx.parameter("ref"), Some(&json!("home")));
    }

    #[test]
    fn test_malformed_body() {
        let ctx = profile("{age:");
        assert_eq!(ctx.outcome().code, codes::MALFORMED_BODY);
        assert!(ctx.parameters().is_empty());
    }

    #[test]
    fn test_invalid_parameters() {
        let ctx = profile(r#"{"age": "20", "color": "red", "bio": "x"}"#);
        assert_eq!(ctx.outcome().code, codes::INVALID_PARAMETERS);
    }

    #[test]
    fn test_parameterless_resource_ignores_body() {
        let mut ctx = RequestContext::new("/users", "POST").with_body("not json");
        ctx.set_resource(Arc::new(ResourceDefinition::new("h")));
        PayloadValidation::default().process(&mut ctx);
        assert!(ctx.is_successful());
    }

    #[test]
    fn test_custom_validators_run_after_checks() {
        let mut validators = ValidatorRegistry::new();
        validators.register(fixtures::EMAIL_VALIDATOR, |value, ctx| {
            // Validators see the already-validated parameter map.
            assert!(ctx.parameter("email").is_some());
            if value.as_str().is_some_and(|s| s.contains('@')) {
                Outcome::ok()
            } else {
                Outcome::new(fixtures::INVALID_EMAIL)
            }
        });
        let stage = PayloadValidation::new(validators);
        let registry = fixtures::sample_registry();
        let signup = Arc::clone(registry.resource("signup", "POST").unwrap());

        let mut ok = RequestContext::new("/signup", "POST").with_body(r#"{"email": "a@b.c"}"#);
        ok.set_resource(Arc::clone(&signup));
        stage.process(&mut ok);
        assert!(ok.is_successful());

        let mut bad = RequestContext::new("/signup", "POST").with_body(r#"{"email": "ab.c"}"#);
        bad.set_resource(signup);
        stage.process(&mut bad);
        assert_eq!(bad.outcome().code, fixtures::INVALID_EMAIL);
        assert_eq!(bad.outcome().data["input"], json!("ab.c"));
    }
}
