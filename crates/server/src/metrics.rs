//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the Flock server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Job counts by status (collected dynamically)
//! - Core job, search and aggregation metrics (registered from `flock_core`)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};
use regex_lite::Regex;
use tracing::error;

use flock_core::{JobFilter, JobStatus};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "flock_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("flock_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "flock_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Job Metrics
// =============================================================================

/// Current number of jobs by status.
pub static JOBS_BY_STATUS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("flock_jobs_by_status", "Current number of jobs in each status"),
        &["status"],
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // HTTP
        Box::new(HTTP_REQUEST_DURATION.clone()),
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()),
        // Jobs
        Box::new(JOBS_BY_STATUS.clone()),
    ];

    // Core metrics (jobs, search, aggregation)
    for metric in collectors.into_iter().chain(flock_core::metrics::all_metrics()) {
        if let Err(e) = registry.register(metric) {
            error!("Failed to register metric: {}", e);
        }
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so the status gauges reflect the store.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    for status in [
        JobStatus::Pending,
        JobStatus::Running,
        JobStatus::Complete,
        JobStatus::Failed,
    ] {
        let filter = JobFilter::new().with_status(status);
        if let Ok(count) = state.store().count(&filter) {
            JOBS_BY_STATUS
                .with_label_values(&[status.as_str()])
                .set(count);
        }
    }
}

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .unwrap()
});

static NUMERIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let result = UUID_RE.replace_all(path, "{id}");
    let result = NUMERIC_RE.replace_all(&result, "/{id}$1");
    result.to_string()
}
