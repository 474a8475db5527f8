//! Pipeline stages.
//!
//! One module per fixed stage; see [`Stage`](crate::Stage) for the order.
//!
//! - [`negotiation`] - `Accept` → response format
//! - [`resolution`] - (path, method) → resource
//! - [`network`] - resource network policy
//! - [`authentication`] - bearer token extraction and the authorization hook
//! - [`payload`] - body parsing and parameter validation
//! - [`hooks`] - pre- and post-execution backend hooks
//! - [`execution`] - handler dispatch

pub mod authentication;
pub mod execution;
pub mod hooks;
pub mod negotiation;
pub mod network;
pub mod payload;
pub mod resolution;

pub use authentication::{Authentication, TokenExtraction};
pub use execution::Execution;
pub use hooks::{PostExecution, PreExecution};
pub use negotiation::ContentNegotiation;
pub use network::NetworkGuard;
pub use payload::PayloadValidation;
pub use resolution::Resolution;
