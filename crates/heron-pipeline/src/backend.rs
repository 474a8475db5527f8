//! Backend hooks.
//!
//! A [`Backend`] supplies the deployment-specific callbacks around the
//! handler: token authorization and the pre/post execution hooks. Each hook's
//! outcome replaces the context's current outcome; anything other than success
//! stops the pipeline.

use heron_core::{Outcome, RequestContext};

/// Deployment-specific callbacks invoked by the dispatcher.
///
/// # Example
///
/// ```
/// use heron_core::{Outcome, RequestContext};
/// use heron_pipeline::Backend;
///
/// struct StaticTokens;
///
/// impl Backend for StaticTokens {
///     fn authorize_user(&self, ctx: &mut RequestContext) -> Outcome {
///         match ctx.token() {
///             Some("letmein") => Outcome::ok(),
///             _ => Outcome::new("TOKEN_REJECTED"),
///         }
///     }
/// }
/// ```
pub trait Backend: Send + Sync {
    /// Validates the extracted bearer token.
    ///
    /// Only called for resources that require authentication, after the token
    /// has been extracted into [`RequestContext::token`].
    fn authorize_user(&self, ctx: &mut RequestContext) -> Outcome;

    /// Runs before the handler. Keeps the current outcome by default.
    fn before_handler(&self, ctx: &mut RequestContext) -> Outcome {
        ctx.outcome().clone()
    }

    /// Runs after a successful handler. Keeps the handler's outcome by default.
    fn after_handler(&self, ctx: &mut RequestContext) -> Outcome {
        ctx.outcome().clone()
    }
}

/// Backend that accepts every token and leaves outcomes untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBackend;

impl Backend for NoopBackend {
    fn authorize_user(&self, ctx: &mut RequestContext) -> Outcome {
        ctx.outcome().clone()
    }
}
