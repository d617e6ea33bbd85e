//! Metrics collection and export for roster.
//!
//! Uses the `metrics` crate for instrumentation and exports
//! to Prometheus format.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use roster_core::StoreStats;
use roster_protocol::EventKind;
use std::net::SocketAddr;
use tracing::info;

/// Metric names.
pub mod names {
    pub const EVENTS_TOTAL: &str = "roster_events_total";
    pub const DECODE_ERRORS_TOTAL: &str = "roster_decode_errors_total";
    pub const DESYNCS_TOTAL: &str = "roster_desyncs_total";
    pub const CHANNELS_TRACKED: &str = "roster_channels_tracked";
    pub const NICKS_TRACKED: &str = "roster_nicks_tracked";
}

/// Initialize the metrics system.
pub fn init_metrics() {
    metrics::describe_counter!(names::EVENTS_TOTAL, "Presence events applied, by kind");
    metrics::describe_counter!(
        names::DECODE_ERRORS_TOTAL,
        "Lines that could not be decoded"
    );
    metrics::describe_counter!(
        names::DESYNCS_TOTAL,
        "Events that referenced untracked presence state"
    );
    metrics::describe_gauge!(names::CHANNELS_TRACKED, "Channels currently tracked");
    metrics::describe_gauge!(names::NICKS_TRACKED, "Nicknames currently known");

    info!("Metrics initialized");
}

/// Start the Prometheus exporter.
///
/// # Errors
///
/// Returns an error if the exporter cannot be installed.
pub fn start_metrics_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    info!("Metrics server listening on {}", addr);
    Ok(())
}

/// Record an event handed to the session.
pub fn record_event(kind: EventKind) {
    counter!(names::EVENTS_TOTAL, "kind" => kind.as_str()).increment(1);
}

/// Record an undecodable line.
pub fn record_decode_error() {
    counter!(names::DECODE_ERRORS_TOTAL).increment(1);
}

/// Publish store statistics.
pub fn set_store_stats(stats: &StoreStats) {
    gauge!(names::CHANNELS_TRACKED).set(stats.channels as f64);
    gauge!(names::NICKS_TRACKED).set(stats.nicks as f64);
    counter!(names::DESYNCS_TOTAL).absolute(stats.desyncs);
}
