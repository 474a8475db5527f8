//! Telemetry configuration.
//!
//! One [`TelemetryConfig`] drives both subsystems. The service name is copied
//! into the logging configuration on build, so the startup event and the
//! metrics share it.

use crate::error::TelemetryError;
use crate::logging::{LogConfig, LogFormat};
use crate::metrics::MetricsConfig;
use crate::TelemetryResult;
use std::net::SocketAddr;

/// Default service name.
pub const DEFAULT_SERVICE_NAME: &str = "heron";

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name, used in the startup log event.
    pub service_name: String,

    /// Metrics configuration.
    pub metrics: MetricsConfig,

    /// Logging configuration.
    pub logging: LogConfig,
}

impl TelemetryConfig {
    /// Starts from the defaults: JSON logs at `info`, metrics on `0.0.0.0:9090`.
    #[must_use]
    pub fn builder() -> TelemetryConfigBuilder {
        TelemetryConfigBuilder::default()
    }

    /// Both subsystems off. Useful in tests and one-shot tools.
    #[must_use]
    pub fn disabled() -> Self {
        Self::builder().without_logging().without_metrics().build()
    }

    /// Checks the settings [`init_telemetry`](crate::init_telemetry) relies on.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` for an empty service name or log level, or duration
    ///   buckets that are empty, non-positive or not strictly increasing
    /// - `InvalidAddress` for an unparseable metrics address
    ///
    /// Disabled subsystems are not checked.
    pub fn validate(&self) -> TelemetryResult<()> {
        if self.service_name.trim().is_empty() {
            return Err(TelemetryError::InvalidConfig(
                "service name must not be empty".to_string(),
            ));
        }

        if self.logging.enabled && self.logging.level.trim().is_empty() {
            return Err(TelemetryError::InvalidConfig(
                "log level must not be empty".to_string(),
            ));
        }

        if self.metrics.enabled {
            self.metrics
                .addr
                .parse::<SocketAddr>()
                .map_err(|e| TelemetryError::InvalidAddress(format!("{}: {e}", self.metrics.addr)))?;
            check_buckets(&self.metrics.duration_buckets)?;
        }

        Ok(())
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn check_buckets(buckets: &[f64]) -> TelemetryResult<()> {
    if buckets.is_empty() {
        return Err(TelemetryError::InvalidConfig(
            "duration buckets must not be empty".to_string(),
        ));
    }
    if buckets.iter().any(|b| !b.is_finite() || *b <= 0.0) {
        return Err(TelemetryError::InvalidConfig(
            "duration buckets must be positive".to_string(),
        ));
    }
    if buckets.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(TelemetryError::InvalidConfig(
            "duration buckets must be strictly increasing".to_string(),
        ));
    }
    Ok(())
}

/// Builder for [`TelemetryConfig`].
#[derive(Debug)]
pub struct TelemetryConfigBuilder {
    config: TelemetryConfig,
}

impl Default for TelemetryConfigBuilder {
    fn default() -> Self {
        Self {
            config: TelemetryConfig {
                service_name: DEFAULT_SERVICE_NAME.to_string(),
                metrics: MetricsConfig::default(),
                logging: LogConfig::default(),
            },
        }
    }
}

impl TelemetryConfigBuilder {
    /// Sets the service name.
    #[must_use]
    pub fn service_name(mut self, name: &str) -> Self {
        self.config.service_name = name.to_string();
        self
    }

    /// Replaces the logging configuration.
    #[must_use]
    pub fn logging(mut self, config: LogConfig) -> Self {
        self.config.logging = config;
        self
    }

    /// Sets the log filter directive, e.g. `"heron_pipeline=debug,info"`.
    #[must_use]
    pub fn log_level(mut self, level: &str) -> Self {
        self.config.logging.level = level.to_string();
        self
    }

    /// Sets the log output format.
    #[must_use]
    pub fn log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    /// Turns logging off.
    #[must_use]
    pub fn without_logging(mut self) -> Self {
        self.config.logging.enabled = false;
        self
    }

    /// Replaces the metrics configuration.
    #[must_use]
    pub fn metrics(mut self, config: MetricsConfig) -> Self {
        self.config.metrics = config;
        self
    }

    /// Enables metrics on the given scrape address.
    #[must_use]
    pub fn metrics_addr(mut self, addr: &str) -> Self {
        self.config.metrics.enabled = true;
        self.config.metrics.addr = addr.to_string();
        self
    }

    /// Sets the request duration histogram buckets, in seconds.
    #[must_use]
    pub fn duration_buckets(mut self, buckets: Vec<f64>) -> Self {
        self.config.metrics.duration_buckets = buckets;
        self
    }

    /// Disables the metrics listener.
    #[must_use]
    pub fn without_metrics(mut self) -> Self {
        self.config.metrics.enabled = false;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> TelemetryConfig {
        let mut config = self.config;
        config.logging.service_name.clone_from(&config.service_name);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, DEFAULT_SERVICE_NAME);
        assert_eq!(config.logging.service_name, DEFAULT_SERVICE_NAME);
        assert!(config.metrics.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_service_name_reaches_logging() {
        let config = TelemetryConfig::builder()
            .logging(LogConfig::default())
            .service_name("billing")
            .build();
        assert_eq!(config.logging.service_name, "billing");
    }

    #[test]
    fn test_logging_shortcuts() {
        let config = TelemetryConfig::builder()
            .log_level("heron_pipeline=debug")
            .log_format(LogFormat::Pretty)
            .build();
        assert_eq!(config.logging.level, "heron_pipeline=debug");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.logging.enabled);
    }

    #[test]
    fn test_metrics_toggles() {
        let config = TelemetryConfig::builder()
            .without_metrics()
            .metrics_addr("127.0.0.1:9999")
            .build();
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.addr, "127.0.0.1:9999");

        let config = TelemetryConfig::builder().without_metrics().build();
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_disabled() {
        let config = TelemetryConfig::disabled();
        assert!(!config.logging.enabled);
        assert!(!config.metrics.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let err = TelemetryConfig::builder().service_name(" ").build().validate();
        assert!(matches!(err, Err(TelemetryError::InvalidConfig(_))));

        let err = TelemetryConfig::builder().metrics_addr("nowhere").build().validate();
        assert!(matches!(err, Err(TelemetryError::InvalidAddress(_))));

        for buckets in [vec![], vec![0.0, 1.0], vec![0.5, 0.5], vec![1.0, 0.1]] {
            let err = TelemetryConfig::builder()
                .duration_buckets(buckets.clone())
                .build()
                .validate();
            assert!(
                matches!(err, Err(TelemetryError::InvalidConfig(_))),
                "{buckets:?}"
            );
        }
    }

    #[test]
    fn test_validate_skips_disabled_subsystems() {
        let config = TelemetryConfig::builder()
            .metrics_addr("nowhere")
            .without_metrics()
            .log_level("")
            .without_logging()
            .build();
        assert!(config.validate().is_ok());
    }
}
