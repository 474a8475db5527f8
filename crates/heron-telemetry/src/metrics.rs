//! Prometheus metrics for Heron.
//!
//! Recording goes through the `metrics` facade, so every recording function is
//! a no-op until [`init_metrics`] installs the Prometheus recorder.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `heron_requests_total` | Counter | `code`, `status` | Dispatched requests |
//! | `heron_request_duration_seconds` | Histogram | `code` | Dispatch latency |
//! | `heron_rejections_total` | Counter | `stage`, `code` | Requests stopped before the handler |
//! | `heron_handler_panics_total` | Counter | `handler` | Panics recovered during dispatch |
//! | `heron_in_flight_requests` | Gauge | - | Requests being served |
//! | `heron_request_size_bytes` | Histogram | - | Request body size |
//! | `heron_response_size_bytes` | Histogram | - | Response body size |

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;

/// Request counter name.
pub const REQUESTS_TOTAL: &str = "heron_requests_total";
/// Request latency histogram name.
pub const REQUEST_DURATION_SECONDS: &str = "heron_request_duration_seconds";
/// Pre-handler rejection counter name.
pub const REJECTIONS_TOTAL: &str = "heron_rejections_total";
/// Recovered panic counter name.
pub const HANDLER_PANICS_TOTAL: &str = "heron_handler_panics_total";
/// In-flight gauge name.
pub const IN_FLIGHT_REQUESTS: &str = "heron_in_flight_requests";
/// Request body size histogram name.
pub const REQUEST_SIZE_BYTES: &str = "heron_request_size_bytes";
/// Response body size histogram name.
pub const RESPONSE_SIZE_BYTES: &str = "heron_response_size_bytes";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Address of the Prometheus scrape listener (e.g. "0.0.0.0:9090").
    pub addr: String,

    /// Histogram buckets for request duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            addr: "0.0.0.0:9090".to_string(),
            // 1ms .. 10s
            duration_buckets: vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        }
    }
}

/// Installs the Prometheus recorder and starts its scrape listener.
///
/// Must be called from within a Tokio runtime: the listener runs as a task on
/// the current runtime.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidAddress` for an unparseable address,
/// `TelemetryError::InvalidConfig` outside a runtime and
/// `TelemetryError::MetricsInit` if the exporter cannot be built or a global
/// recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let addr: SocketAddr = config
        .addr
        .parse()
        .map_err(|e| TelemetryError::InvalidAddress(format!("{}: {e}", config.addr)))?;

    let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
        TelemetryError::InvalidConfig("the metrics listener requires a Tokio runtime".to_string())
    })?;

    let (recorder, exporter) = {
        let _enter = runtime.enter();
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .set_buckets_for_metric(
                Matcher::Full(REQUEST_DURATION_SECONDS.to_string()),
                &config.duration_buckets,
            )
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?
            .build()
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?
    };

    let handle = recorder.handle();
    metrics::set_global_recorder(recorder)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    let _ = METRICS_HANDLE.set(handle);

    runtime.spawn(async move {
        if let Err(e) = exporter.await {
            tracing::error!(error = ?e, "metrics listener stopped");
        }
    });

    register_metric_descriptions();
    tracing::info!(%addr, "metrics listener started");

    Ok(())
}

/// Renders metrics in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(REQUESTS_TOTAL, "Total number of dispatched requests");
    describe_histogram!(
        REQUEST_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Dispatch duration in seconds"
    );
    describe_counter!(
        REJECTIONS_TOTAL,
        "Requests stopped by a pipeline stage before the handler"
    );
    describe_counter!(HANDLER_PANICS_TOTAL, "Panics recovered during dispatch");
    describe_gauge!(IN_FLIGHT_REQUESTS, "Requests currently being served");
    describe_histogram!(
        REQUEST_SIZE_BYTES,
        metrics::Unit::Bytes,
        "Request body size in bytes"
    );
    describe_histogram!(
        RESPONSE_SIZE_BYTES,
        metrics::Unit::Bytes,
        "Response body size in bytes"
    );
}

/// Records a dispatched request.
pub fn record_request(code: &str, status: u16, duration: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "code" => code.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(REQUEST_DURATION_SECONDS, "code" => code.to_string())
        .record(duration.as_secs_f64());
}

/// Records a request stopped by `stage` with `code`.
pub fn record_rejection(stage: &'static str, code: &str) {
    counter!(REJECTIONS_TOTAL, "stage" => stage, "code" => code.to_string()).increment(1);
}

/// Records a recovered panic.
pub fn record_panic(handler: &str) {
    counter!(HANDLER_PANICS_TOTAL, "handler" => handler.to_string()).increment(1);
}

/// Records request body size.
pub fn record_request_size(size_bytes: usize) {
    histogram!(REQUEST_SIZE_BYTES).record(size_bytes as f64);
}

/// Records response body size.
pub fn record_response_size(size_bytes: usize) {
    histogram!(RESPONSE_SIZE_BYTES).record(size_bytes as f64);
}

/// Guard that tracks one in-flight request.
///
/// The gauge is decremented on drop, including during unwinding.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Increments the in-flight gauge.
    #[must_use]
    pub fn new() -> Self {
        gauge!(IN_FLIGHT_REQUESTS).increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(IN_FLIGHT_REQUESTS).decrement(1.0);
    }
}
