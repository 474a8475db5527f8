//! # Heron Core
//!
//! Core types for the Heron request pipeline.
//!
//! This crate provides the data model shared by every other Heron crate:
//!
//! - [`SchemaRegistry`] - Immutable (path, method) → [`ResourceDefinition`] table,
//!   plus response codes and custom messages
//! - [`ResourceDefinition`], [`ParameterSpec`], [`NetworkPolicy`] - The declarative
//!   resource contract
//! - [`RequestContext`] - Per-request state threaded through the pipeline
//! - [`Outcome`] - The uniform success/failure result of every stage and callback
//! - [`ResponseCode`] - HTTP status and localized messages for a result code
//! - [`ValueKind`] - Tag classification of decoded JSON values

#![doc(html_root_url = "https://docs.rs/heron-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod codes;
mod context;
mod error;
pub mod fixtures;
mod outcome;
mod resource;
mod schema;
mod value;

pub use codes::{CodeTable, ResponseCode};
pub use context::{normalize_path, ContentType, RequestContext, RequestId, INDEX_PATH};
pub use error::{SchemaError, SchemaResult};
pub use outcome::Outcome;
pub use resource::{
    NetworkAction, NetworkPolicy, ParamKind, ParamSource, ParameterSpec, ResourceDefinition,
};
pub use schema::{
    MessageTable, Resolution, RouteTable, SchemaRegistry, SchemaRegistryBuilder,
};
pub use value::ValueKind;
