//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Workflow runs (terminal outcome of each inbound message)
//! - Folder phase (created, failed, skipped)
//! - External services (metadata lookup, DSM FileStation/DownloadStation)

use std::time::Instant;

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Workflow Metrics
// =============================================================================

/// Workflow runs total by outcome.
pub static WORKFLOW_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("nasbot_workflow_runs_total", "Total workflow runs"),
        // "queued", "task_failed", "magnet_not_found", "torrent_not_found", "metadata_unavailable"
        &["outcome"],
    )
    .unwrap()
});

/// Folder phase results.
pub static FOLDER_PHASE: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "nasbot_folder_phase_total",
            "Dedicated folder handling per workflow run",
        ),
        &["result"], // "created", "failed", "not_needed", "unnamed"
    )
    .unwrap()
});

// =============================================================================
// External Service Metrics
// =============================================================================

/// External service request duration.
pub static EXTERNAL_SERVICE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "nasbot_external_service_duration_seconds",
            "Duration of external service calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 100.0]),
        &["service", "operation"],
    )
    .unwrap()
});

/// External service requests total.
pub static EXTERNAL_SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "nasbot_external_service_requests_total",
            "Total external service requests",
        ),
        &["service", "operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

/// Session close failures (always absorbed).
pub static LOGOUT_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "nasbot_logout_failures_total",
            "Total DSM session close failures",
        ),
        &["service"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Record duration and status of one external call started at `started`.
pub fn record_remote_call(service: &str, operation: &str, started: Instant, success: bool) {
    EXTERNAL_SERVICE_DURATION
        .with_label_values(&[service, operation])
        .observe(started.elapsed().as_secs_f64());
    let status = if success { "success" } else { "error" };
    EXTERNAL_SERVICE_REQUESTS
        .with_label_values(&[service, operation, status])
        .inc();
}

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Workflow
        Box::new(WORKFLOW_RUNS.clone()),
        Box::new(FOLDER_PHASE.clone()),
        // External services
        Box::new(EXTERNAL_SERVICE_DURATION.clone()),
        Box::new(EXTERNAL_SERVICE_REQUESTS.clone()),
        Box::new(LOGOUT_FAILURES.clone()),
    ]
}
