//! Top-level configuration.

use crate::{ConfigError, SchemaSection, ServerSection, TelemetrySection};
use heron_telemetry::LogFormat;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Complete Heron service configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use heron_config::HeronConfig;
///
/// let config = HeronConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct HeronConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Logging and metrics settings.
    #[serde(default)]
    pub telemetry: TelemetrySection,

    /// Schema document locations.
    #[serde(default)]
    pub schema: SchemaSection,
}

impl HeronConfig {
    /// Checks values serde cannot check.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - `server.http_addr` is not a socket address
    /// - `server.request_timeout_ms` is zero
    /// - `telemetry.service_name` or `telemetry.logging.level` is empty
    /// - metrics are enabled and `telemetry.metrics.addr` is not a socket address
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.http_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }

        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "server.request_timeout_ms",
                "must be greater than zero",
            ));
        }

        if self.telemetry.service_name.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "telemetry.service_name",
                "must not be empty",
            ));
        }

        if self.telemetry.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "telemetry.logging.level",
                "must not be empty",
            ));
        }

        if self.telemetry.metrics.enabled
            && self.telemetry.metrics.addr.parse::<SocketAddr>().is_err()
        {
            return Err(ConfigError::invalid_value(
                "telemetry.metrics.addr",
                format!("invalid socket address: {}", self.telemetry.metrics.addr),
            ));
        }

        Ok(())
    }

    /// Local development preset: pretty debug logs, no metrics listener.
    ///
    /// ```
    /// use heron_config::HeronConfig;
    ///
    /// let config = HeronConfig::development();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// assert!(!config.telemetry.metrics.enabled);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.server.http_addr = "127.0.0.1:8080".to_string();
        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config.telemetry.metrics.enabled = false;
        config
    }

    /// Production preset: JSON info logs with metrics.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = LogFormat::Json;
        config.telemetry.metrics.enabled = true;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(HeronConfig::default().validate().is_ok());
        assert!(HeronConfig::development().validate().is_ok());
        assert!(HeronConfig::production().validate().is_ok());
    }

    #[test]
    fn test_invalid_http_addr() {
        let mut config = HeronConfig::default();
        config.server.http_addr = "localhost".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.http_addr"));
    }

    #[test]
    fn test_zero_request_timeout() {
        let mut config = HeronConfig::default();
        config.server.request_timeout_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "server.request_timeout_ms"
        ));
    }

    #[test]
    fn test_metrics_addr_only_checked_when_enabled() {
        let mut config = HeronConfig::default();
        config.telemetry.metrics.addr = "nowhere".to_string();
        assert!(config.validate().is_err());

        config.telemetry.metrics.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_top_level_section() {
        let result: Result<HeronConfig, _> = serde_json::from_str(r#"{"database": {}}"#);
        assert!(result.is_err());
    }
}
