//! # Heron Pipeline
//!
//! The request dispatcher: a fixed sequence of stages that turns a
//! [`RequestContext`](heron_core::RequestContext) into a [`Response`].
//!
//! - [`Dispatcher`] - runs the stages and assembles the response
//! - [`Backend`] - authorization and pre/post execution hooks
//! - [`HandlerRegistry`], [`ValidatorRegistry`] - named callbacks
//! - [`network`] - CIDR-based network policy evaluation
//! - [`validation`] - body parsing and parameter validation
//! - [`ResponseBuilder`] - JSON/XML envelope assembly
//!
//! Request-path failures never surface as Rust errors. Every stage reports
//! through the context's [`Outcome`](heron_core::Outcome), and the first
//! non-success outcome skips the remaining guarded stages.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod backend;
pub mod dispatcher;
pub mod network;
pub mod recovery;
pub mod registry;
pub mod response;
pub mod stage;
pub mod stages;
pub mod validation;

pub use backend::{Backend, NoopBackend};
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use registry::{Handler, HandlerRegistry, Validator, ValidatorRegistry};
pub use response::{Response, ResponseBuilder, ResponseError};
pub use stage::{PipelineStage, Stage};
