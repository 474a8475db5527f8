//! # Heron Server
//!
//! Transport adapters and an HTTP server for the Heron request pipeline.
//!
//! - [`Server`]: hyper/tokio HTTP/1.1 server with graceful shutdown
//! - [`adapter`]: `http` request and API-gateway event conversion
//! - [`ShutdownSignal`] and [`ConnectionTracker`] for coordinated shutdown
//!
//! ## Example
//!
//! ```rust,ignore
//! use heron_config::{ConfigLoader, SchemaFiles};
//! use heron_pipeline::Dispatcher;
//! use heron_server::{Server, ServerConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().with_env_prefix("HERON").load()?;
//!     heron_telemetry::init_telemetry(&config.telemetry.to_telemetry_config())?;
//!
//!     let registry = SchemaFiles::from_section(&config.schema).load()?;
//!     let dispatcher = Dispatcher::builder(Arc::new(registry))
//!         .handler("list_users", list_users)
//!         .build();
//!
//!     Server::new(ServerConfig::from(&config.server), dispatcher).run().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod adapter;
mod config;
mod error;
mod server;
mod shutdown;

pub use adapter::{handle_gateway_event, GatewayEvent, GatewayResponse};
pub use config::{ServerConfig, ServerConfigBuilder};
pub use error::ServerError;
pub use server::{HttpResponse, Server};
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownSignal};
