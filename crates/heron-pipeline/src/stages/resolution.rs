//! Resource resolution.

use crate::stage::{PipelineStage, Stage};
use heron_core::{codes, Outcome, RequestContext, SchemaRegistry};
use std::sync::Arc;

/// Stage 2: maps the request path and method to a resource.
///
/// - unknown path → `ROUTE_NOT_FOUND`
/// - known path, `OPTIONS` → `PREFLIGHT`, declared or not
/// - known path, undeclared method → `METHOD_NOT_ALLOWED`
#[derive(Debug, Clone)]
pub struct Resolution {
    registry: Arc<SchemaRegistry>,
}

impl Resolution {
    /// Creates the stage over a registry.
    #[must_use]
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }
}

impl PipelineStage for Resolution {
    fn stage(&self) -> Stage {
        Stage::Resolution
    }

    fn process(&self, ctx: &mut RequestContext) {
        match self.registry.resolve(ctx.path(), ctx.method()) {
            heron_core::Resolution::NotFound => {
                ctx.set_outcome(Outcome::new(codes::ROUTE_NOT_FOUND));
            }
            _ if ctx.method() == "OPTIONS" => {
                ctx.set_outcome(Outcome::new(codes::PREFLIGHT));
            }
            heron_core::Resolution::Found(resource) => {
                tracing::debug!(handler = %resource.handler, "resource resolved");
                ctx.set_resource(Arc::clone(resource));
            }
            heron_core::Resolution::MethodNotAllowed => {
                ctx.set_outcome(Outcome::new(codes::METHOD_NOT_ALLOWED));
            }
        }
    }
}
