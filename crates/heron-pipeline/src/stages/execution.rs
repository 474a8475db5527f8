//! Handler dispatch.

use crate::recovery;
use crate::registry::HandlerRegistry;
use crate::stage::{PipelineStage, Stage};
use heron_core::{codes, Outcome, RequestContext};

/// Stage 8: invokes the resource handler under panic recovery.
///
/// - unregistered handler → `HANDLER_UNIMPLEMENTED` with the handler name
/// - panic → `INTERNAL_ERROR` with the panic message
/// - returned outcome without a code → success
#[derive(Debug, Clone, Default)]
pub struct Execution {
    handlers: HandlerRegistry,
}

impl Execution {
    /// Creates the stage over a handler registry.
    #[must_use]
    pub fn new(handlers: HandlerRegistry) -> Self {
        Self { handlers }
    }
}

impl PipelineStage for Execution {
    fn stage(&self) -> Stage {
        Stage::Execution
    }

    fn process(&self, ctx: &mut RequestContext) {
        let Some(name) = ctx.resource().map(|r| r.handler.clone()) else {
            return;
        };

        let Some(handler) = self.handlers.get(&name) else {
            tracing::warn!(handler = %name, "handler not registered");
            ctx.set_outcome(Outcome::new(codes::HANDLER_UNIMPLEMENTED).with_data(name));
            return;
        };

        tracing::debug!(handler = %name, "invoking handler");
        let outcome = match recovery::catch(|| handler(ctx)) {
            Ok(outcome) => outcome.normalized(),
            Err(message) => {
                tracing::error!(handler = %name, panic = %message, "handler panicked");
                heron_telemetry::metrics::record_panic(&name);
                Outcome::internal_error(message)
            }
        };
        ctx.set_outcome(outcome);
    }
}
