//! Content-type negotiation.
//!
//! The only negotiable alternative to JSON is XML, chosen when `Accept` is
//! exactly `application/xml` and no format has been preset on the context.

use crate::stage::{PipelineStage, Stage};
use heron_core::{ContentType, RequestContext};

/// `Accept` value that selects XML.
pub const XML_ACCEPT: &str = "application/xml";

/// Stage 1: picks the response format. Always runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentNegotiation;

impl PipelineStage for ContentNegotiation {
    fn stage(&self) -> Stage {
        Stage::Negotiation
    }

    fn process(&self, ctx: &mut RequestContext) {
        if ctx.content_type().is_none() && ctx.header("accept") == Some(XML_ACCEPT) {
            tracing::debug!("XML response requested");
            ctx.set_content_type(ContentType::Xml);
        }
    }
}
