//! Configuration section types.

use heron_telemetry::{LogConfig, LogFormat, MetricsConfig, TelemetryConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// HTTP server section.
///
/// # Example
///
/// ```
/// use heron_config::ServerSection;
///
/// let server = ServerSection::default();
/// assert_eq!(server.http_addr, "0.0.0.0:8080");
/// assert_eq!(server.request_timeout_ms, 30_000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// Bind address (e.g. "0.0.0.0:8080").
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Whole-request timeout in milliseconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

fn default_http_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    30_000
}

/// Prometheus metrics section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Start the scrape listener.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Scrape listener address.
    #[serde(default = "default_metrics_addr")]
    pub addr: String,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            enabled: true,
            addr: default_metrics_addr(),
        }
    }
}

fn default_metrics_addr() -> String {
    "0.0.0.0:9090".to_string()
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Install the log subscriber.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (trace, debug, info, warn, error or a full `EnvFilter` string).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telemetry section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TelemetrySection {
    /// Service name attached to logs.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSection,

    /// Metrics settings.
    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for TelemetrySection {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            logging: LoggingSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

fn default_service_name() -> String {
    "heron".to_string()
}

impl TelemetrySection {
    /// Converts the section into the telemetry crate's configuration.
    ///
    /// ```
    /// use heron_config::TelemetrySection;
    ///
    /// let section = TelemetrySection {
    ///     service_name: "accounts".to_string(),
    ///     ..Default::default()
    /// };
    /// let config = section.to_telemetry_config();
    /// assert_eq!(config.logging.service_name, "accounts");
    /// ```
    #[must_use]
    pub fn to_telemetry_config(&self) -> TelemetryConfig {
        let logging = LogConfig {
            enabled: self.logging.enabled,
            level: self.logging.level.clone(),
            format: self.logging.format,
            ..LogConfig::default()
        };
        let metrics = MetricsConfig {
            enabled: self.metrics.enabled,
            addr: self.metrics.addr.clone(),
            ..MetricsConfig::default()
        };

        TelemetryConfig::builder()
            .service_name(&self.service_name)
            .logging(logging)
            .metrics(metrics)
            .build()
    }
}

/// Schema document locations.
///
/// Only the routes document is mandatory; an unset codes or messages path
/// means an empty table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SchemaSection {
    /// Routes document (path → method → resource).
    #[serde(default = "default_routes_path")]
    pub routes: PathBuf,

    /// Codes document (code → descriptor).
    #[serde(default)]
    pub codes: Option<PathBuf>,

    /// Messages document (key → locale → text).
    #[serde(default)]
    pub messages: Option<PathBuf>,
}

impl Default for SchemaSection {
    fn default() -> Self {
        Self {
            routes: default_routes_path(),
            codes: None,
            messages: None,
        }
    }
}

fn default_routes_path() -> PathBuf {
    PathBuf::from("schema/routes.json")
}

fn default_true() -> bool {
    true
}
