//! Bearer token extraction and the authorization hook.
//!
//! Both stages only act on resources that declare `authentication: true`.

use crate::backend::Backend;
use crate::stage::{PipelineStage, Stage};
use heron_core::{codes, Outcome, RequestContext};
use std::sync::Arc;

/// Authorization header name.
pub const AUTHORIZATION_HEADER: &str = "authorization";

fn requires_auth(ctx: &RequestContext) -> bool {
    ctx.resource().is_some_and(|r| r.authentication)
}

/// Extracts the token from an `Authorization` header value.
///
/// The value is split on whitespace and the second field is the token.
///
/// ```
/// use heron_pipeline::stages::authentication::extract_token;
///
/// assert_eq!(extract_token("Bearer abcd1234"), Some("abcd1234"));
/// assert_eq!(extract_token("abcd1234"), None);
/// ```
#[must_use]
pub fn extract_token(header: &str) -> Option<&str> {
    header.split_whitespace().nth(1)
}

/// Stage 4: reads the bearer token into the context.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenExtraction;

impl PipelineStage for TokenExtraction {
    fn stage(&self) -> Stage {
        Stage::TokenExtraction
    }

    fn process(&self, ctx: &mut RequestContext) {
        if !requires_auth(ctx) {
            return;
        }

        let token = match ctx.header(AUTHORIZATION_HEADER) {
            Some(value) => extract_token(value)
                .map(str::to_string)
                .ok_or(codes::AUTH_HEADER_MALFORMED),
            None => Err(codes::AUTH_HEADER_MISSING),
        };

        match token {
            Ok(token) => ctx.set_token(token),
            Err(code) => {
                tracing::debug!(code, "authorization header rejected");
                ctx.set_outcome(Outcome::new(code));
            }
        }
    }
}

/// Stage 5: asks the backend to authorize the extracted token.
pub struct Authentication {
    backend: Arc<dyn Backend>,
}

impl Authentication {
    /// Creates the stage over a backend.
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

impl std::fmt::Debug for Authentication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authentication").finish_non_exhaustive()
    }
}

impl PipelineStage for Authentication {
    fn stage(&self) -> Stage {
        Stage::Authentication
    }

    fn process(&self, ctx: &mut RequestContext) {
        if !requires_auth(ctx) {
            return;
        }
        let outcome = self.backend.authorize_user(ctx);
        ctx.set_outcome(outcome);
    }
}
