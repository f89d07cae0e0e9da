//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Job lifecycle (submissions, outcomes, durations)
//! - Flight search (provider calls, pair outcomes)
//! - Aggregation (destinations dropped for incomplete coverage)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Job Lifecycle Metrics
// =============================================================================

/// Jobs accepted for processing.
pub static JOBS_SUBMITTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("flock_jobs_submitted_total", "Total jobs accepted").unwrap()
});

/// Jobs that reached a terminal state, by outcome.
pub static JOBS_FINISHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("flock_jobs_finished_total", "Total jobs finished"),
        &["outcome"], // "complete", "failed"
    )
    .unwrap()
});

/// Time from a worker picking a job up to its terminal state.
pub static JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("flock_job_duration_seconds", "Duration of job processing")
            .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
        &["outcome"],
    )
    .unwrap()
});

// =============================================================================
// Flight Search Metrics
// =============================================================================

/// Provider calls by operation and status.
pub static PROVIDER_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("flock_provider_requests_total", "Total flight provider requests"),
        &["operation", "status"], // operation: "search_offers", "resolve_name"; status: "success", "error", "timeout"
    )
    .unwrap()
});

/// Provider call latency.
pub static PROVIDER_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "flock_provider_duration_seconds",
            "Duration of flight provider calls",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["operation"],
    )
    .unwrap()
});

/// Traveler/destination pair outcomes.
pub static PAIR_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "flock_pair_outcomes_total",
            "Traveler/destination search outcomes",
        ),
        &["outcome"], // "found", "no_qualifying_offers", "provider_failed"
    )
    .unwrap()
});

// =============================================================================
// Aggregation Metrics
// =============================================================================

/// Destinations dropped because not every traveler could reach them.
pub static DESTINATIONS_EXCLUDED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "flock_destinations_excluded_total",
        "Destinations dropped for incomplete group coverage",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Jobs
        Box::new(JOBS_SUBMITTED.clone()),
        Box::new(JOBS_FINISHED.clone()),
        Box::new(JOB_DURATION.clone()),
        // Search
        Box::new(PROVIDER_REQUESTS.clone()),
        Box::new(PROVIDER_DURATION.clone()),
        Box::new(PAIR_OUTCOMES.clone()),
        // Aggregation
        Box::new(DESTINATIONS_EXCLUDED.clone()),
    ]
}
