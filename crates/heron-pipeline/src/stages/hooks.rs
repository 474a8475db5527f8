//! Backend hooks around the handler.

use crate::backend::Backend;
use crate::stage::{PipelineStage, Stage};
use heron_core::RequestContext;
use std::sync::Arc;

/// Stage 7: [`Backend::before_handler`].
pub struct PreExecution {
    backend: Arc<dyn Backend>,
}

impl PreExecution {
    /// Creates the stage over a backend.
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

impl PipelineStage for PreExecution {
    fn stage(&self) -> Stage {
        Stage::PreExecution
    }

    fn process(&self, ctx: &mut RequestContext) {
        let outcome = self.backend.before_handler(ctx);
        ctx.set_outcome(outcome);
    }
}

/// Stage 9: [`Backend::after_handler`].
pub struct PostExecution {
    backend: Arc<dyn Backend>,
}

impl PostExecution {
    /// Creates the stage over a backend.
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

impl PipelineStage for PostExecution {
    fn stage(&self) -> Stage {
        Stage::PostExecution
    }

    fn process(&self, ctx: &mut RequestContext) {
        let outcome = self.backend.after_handler(ctx);
        ctx.set_outcome(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heron_core::Outcome;
    use serde_json::json;

    struct Stamping;

    impl Backend for Stamping {
        fn authorize_user(&self, _ctx: &mut RequestContext) -> Outcome {
            Outcome::ok()
        }

        fn before_handler(&self, ctx: &mut RequestContext) -> Outcome {
            ctx.set_extension("stamped");
            Outcome::ok()
        }

        fn after_handler(&self, ctx: &mut RequestContext) -> Outcome {
            let mut outcome = ctx.outcome().clone();
            outcome.data["audited"] = json!(true);
            outcome
        }
    }

    #[test]
    fn test_pre_execution() {
        let mut ctx = RequestContext::new("/x", "GET");
        PreExecution::new(Arc::new(Stamping)).process(&mut ctx);
        assert!(ctx.is_successful());
        assert_eq!(ctx.get_extension::<&str>(), Some(&"stamped"));
    }

    #[test]
    fn test_post_execution_rewrites_outcome() {
        let mut ctx = RequestContext::new("/x", "GET");
        ctx.set_outcome(Outcome::success(json!({"id": 9})));
        PostExecution::new(Arc::new(Stamping)).process(&mut ctx);
        assert_eq!(ctx.outcome().data, json!({"id": 9, "audited": true}));
    }
}
