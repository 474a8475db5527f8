//! Network policy enforcement.

use crate::network::allowed;
use crate::stage::{PipelineStage, Stage};
use heron_core::{codes, Outcome, RequestContext};

/// Stage 3: rejects requesters outside the resource network policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkGuard;

impl PipelineStage for NetworkGuard {
    fn stage(&self) -> Stage {
        Stage::Network
    }

    fn process(&self, ctx: &mut RequestContext) {
        let Some(resource) = ctx.resource() else {
            return;
        };

        if !allowed(ctx.ip(), &resource.network) {
            tracing::info!(ip = %ctx.ip(), "requester rejected by network policy");
            ctx.set_outcome(Outcome::new(codes::NETWORK_DENIED));
        }
    }
}
