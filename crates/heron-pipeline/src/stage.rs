//! Fixed-order stage marker and the stage trait.
//!
//! ## Pipeline Stages
//!
//! 1. **Negotiation** - pick JSON or XML from `Accept` (always runs)
//! 2. **Resolution** - map (path, method) to a resource
//! 3. **Network** - enforce the resource network policy
//! 4. **Token extraction** - read the bearer token (authenticated resources)
//! 5. **Authentication** - backend authorization hook (authenticated resources)
//! 6. **Payload** - parse the body and validate parameters
//! 7. **Pre-execution** - backend hook before the handler
//! 8. **Execution** - invoke the handler
//! 9. **Post-execution** - backend hook after the handler
//! 10. **Response** - assemble the envelope (always runs)
//!
//! Stages 2 through 9 are guarded: each runs only while the current outcome is
//! success.

use heron_core::RequestContext;

/// A guarded pipeline stage.
///
/// Stages report failure only through [`RequestContext::set_outcome`]. The
/// dispatcher stops calling stages as soon as the outcome is not success.
pub trait PipelineStage: Send + Sync {
    /// Which fixed stage this is.
    fn stage(&self) -> Stage;

    /// Runs the stage against the context.
    fn process(&self, ctx: &mut RequestContext);
}

/// Pipeline stage marker for the fixed ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Stage {
    /// Stage 1: content-type negotiation
    Negotiation = 1,
    /// Stage 2: resource resolution
    Resolution = 2,
    /// Stage 3: network policy
    Network = 3,
    /// Stage 4: bearer token extraction
    TokenExtraction = 4,
    /// Stage 5: authorization hook
    Authentication = 5,
    /// Stage 6: payload parsing and parameter validation
    Payload = 6,
    /// Stage 7: pre-execution hook
    PreExecution = 7,
    /// Stage 8: handler dispatch
    Execution = 8,
    /// Stage 9: post-execution hook
    PostExecution = 9,
    /// Stage 10: response assembly
    Response = 10,
}

impl Stage {
    /// Returns true if the stage only runs while the outcome is success.
    #[must_use]
    pub const fn is_guarded(self) -> bool {
        !matches!(self, Self::Negotiation | Self::Response)
    }

    /// Returns true if the stage runs before the handler.
    #[must_use]
    pub const fn is_pre_handler(self) -> bool {
        (self as u8) < (Self::Execution as u8)
    }

    /// Returns the stage name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Negotiation => "negotiation",
            Self::Resolution => "resolution",
            Self::Network => "network",
            Self::TokenExtraction => "token_extraction",
            Self::Authentication => "authentication",
            Self::Payload => "payload",
            Self::PreExecution => "pre_execution",
            Self::Execution => "execution",
            Self::PostExecution => "post_execution",
            Self::Response => "response",
        }
    }

    /// Returns all stages in order.
    #[must_use]
    pub const fn all() -> [Stage; 10] {
        [
            Self::Negotiation,
            Self::Resolution,
            Self::Network,
            Self::TokenExtraction,
            Self::Authentication,
            Self::Payload,
            Self::PreExecution,
            Self::Execution,
            Self::PostExecution,
            Self::Response,
        ]
    }

    /// Returns the guarded stages in order.
    #[must_use]
    pub const fn guarded() -> [Stage; 8] {
        [
            Self::Resolution,
            Self::Network,
            Self::TokenExtraction,
            Self::Authentication,
            Self::Payload,
            Self::PreExecution,
            Self::Execution,
            Self::PostExecution,
        ]
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
