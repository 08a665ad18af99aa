//! Prometheus Metrics Definitions
//!
//! Defines all Glimpse metrics with appropriate labels and types.
//! Exposes a /metrics endpoint for Prometheus scraping.

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_histogram_vec, CounterVec, Encoder, Gauge,
    HistogramVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
/// Covers: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Analysis latency buckets (seconds), up to the default timeout
const ANALYSIS_LATENCY_BUCKETS: &[f64] =
    &[0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0];

/// Global metrics instance - initialized on first use
pub static METRICS: Lazy<ApiResult<GlimpseMetrics>> = Lazy::new(GlimpseMetrics::new);

/// Run `f` against the global metrics, skipping silently if registration failed.
pub fn with_metrics(f: impl FnOnce(&GlimpseMetrics)) {
    if let Ok(metrics) = METRICS.as_ref() {
        f(metrics);
    }
}

fn registration_failed(name: &str, err: prometheus::Error) -> ApiError {
    ApiError::internal_error(format!("Failed to register {}: {}", name, err))
}

/// Container for all Glimpse metrics.
#[derive(Clone)]
pub struct GlimpseMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Image request outcomes - labels: outcome (hit/miss/error)
    pub image_requests_total: CounterVec,

    /// Analysis duration histogram - labels: status
    pub analysis_duration_seconds: HistogramVec,

    /// Persistence failures - labels: operation (lookup/insert/append)
    pub persistence_failures_total: CounterVec,

    /// Analysis engine readiness (0 or 1)
    pub engine_ready: Gauge,
}

impl GlimpseMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "glimpse_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| registration_failed("http_requests_total", e))?,

            http_request_duration_seconds: register_histogram_vec!(
                "glimpse_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| registration_failed("http_request_duration_seconds", e))?,

            image_requests_total: register_counter_vec!(
                "glimpse_image_requests_total",
                "Image processing requests by outcome",
                &["outcome"]
            )
            .map_err(|e| registration_failed("image_requests_total", e))?,

            analysis_duration_seconds: register_histogram_vec!(
                "glimpse_analysis_duration_seconds",
                "Analysis engine call duration in seconds",
                &["status"],
                ANALYSIS_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| registration_failed("analysis_duration_seconds", e))?,

            persistence_failures_total: register_counter_vec!(
                "glimpse_persistence_failures_total",
                "Result store and audit log failures",
                &["operation"]
            )
            .map_err(|e| registration_failed("persistence_failures_total", e))?,

            engine_ready: register_gauge!(
                "glimpse_engine_ready",
                "Whether the analysis engine has completed warmup"
            )
            .map_err(|e| registration_failed("engine_ready", e))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, status_str.as_str()])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Record the outcome of an image request: `hit`, `miss` or `error`.
    pub fn record_image_outcome(&self, outcome: &str) {
        self.image_requests_total.with_label_values(&[outcome]).inc();
    }

    /// Record an analysis engine call.
    pub fn record_analysis(&self, success: bool, duration_secs: f64) {
        let status = if success { "success" } else { "error" };
        self.analysis_duration_seconds
            .with_label_values(&[status])
            .observe(duration_secs);
    }

    /// Record a failed persistence operation.
    pub fn record_persistence_failure(&self, operation: &str) {
        self.persistence_failures_total
            .with_label_values(&[operation])
            .inc();
    }

    /// Set engine readiness.
    pub fn set_engine_ready(&self, ready: bool) {
        self.engine_ready.set(if ready { 1.0 } else { 0.0 });
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (
            status = 200,
            description = "Prometheus metrics in text format",
            content_type = "text/plain"
        ),
        (status = 500, description = "Failed to encode metrics"),
    ),
))]
pub async fn metrics_handler() -> impl IntoResponse {
    // Force registration so a fresh process still exposes the families.
    let _ = METRICS.as_ref();

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}
