//! Prometheus metrics for the bot process.
//!
//! Chat-side counters live here; workflow and remote-call metrics come from
//! `nasbot_core::metrics` and are registered into the same registry.

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Inbound chat messages by how they were handled.
pub static MESSAGES_RECEIVED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("nasbot_messages_received_total", "Inbound chat messages"),
        &["result"], // "accepted", "chat_not_allowed", "no_text"
    )
    .unwrap()
});

/// Workflow runs currently executing.
pub static WORKFLOWS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "nasbot_workflows_in_flight",
        "Number of workflow runs currently executing",
    )
    .unwrap()
});

fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(MESSAGES_RECEIVED.clone()))
        .unwrap();
    registry
        .register(Box::new(WORKFLOWS_IN_FLIGHT.clone()))
        .unwrap();

    for metric in nasbot_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
