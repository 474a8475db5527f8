//! Typed configuration for Heron services.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides (`HERON__SECTION__KEY`)
//! - Strict parsing: unknown fields are rejected
//! - Loading of the routes, codes and messages schema documents
//!
//! # Example
//!
//! ```no_run
//! use heron_config::{ConfigLoader, SchemaFiles};
//!
//! # fn main() -> Result<(), heron_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_dotenv()?
//!     .with_optional_file("heron.toml")?
//!     .with_env_prefix("HERON")
//!     .load()?;
//!
//! let registry = SchemaFiles::from_section(&config.schema).load()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! shutdown_timeout_secs = 30
//! request_timeout_ms = 30000
//!
//! [telemetry]
//! service_name = "accounts"
//!
//! [telemetry.logging]
//! enabled = true
//! level = "info"
//! format = "json"
//!
//! [telemetry.metrics]
//! enabled = true
//! addr = "0.0.0.0:9090"
//!
//! [schema]
//! routes = "schema/routes.json"
//! codes = "schema/codes.json"
//! messages = "schema/messages.json"
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod files;
mod loader;
mod schema;

pub use config::HeronConfig;
pub use error::ConfigError;
pub use files::SchemaFiles;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::{LoggingSection, MetricsSection, SchemaSection, ServerSection, TelemetrySection};
