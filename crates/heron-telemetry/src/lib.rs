//! Observability for Heron services.
//!
//! - **Logging**: structured JSON or pretty output through `tracing-subscriber`
//! - **Metrics**: Prometheus-format metrics through the `metrics` facade
//!
//! # Example
//!
//! ```rust,ignore
//! use heron_telemetry::{init_telemetry, TelemetryConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = TelemetryConfig::builder()
//!         .service_name("accounts")
//!         .metrics_addr("0.0.0.0:9090")
//!         .build();
//!
//!     init_telemetry(&config).expect("telemetry");
//! }
//! ```
//!
//! # Metrics Endpoint
//!
//! ```text
//! # TYPE heron_requests_total counter
//! heron_requests_total{code="OK",status="200"} 1234
//! heron_requests_total{code="ROUTE_NOT_FOUND",status="404"} 56
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use config::{TelemetryConfig, TelemetryConfigBuilder, DEFAULT_SERVICE_NAME};
pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig, LogFormat};
pub use metrics::{init_metrics, render_metrics, InFlightGuard, MetricsConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Validates the configuration, then initializes logging and metrics.
///
/// # Errors
///
/// Returns the validation error or the first subsystem initialization error.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    config.validate()?;
    logging::init_logging(&config.logging)?;
    metrics::init_metrics(&config.metrics)?;
    Ok(())
}
