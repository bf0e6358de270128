//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Count proxy outcomes and static requests
//! - Record upstream latency
//! - Optionally expose a Prometheus-compatible scrape endpoint
//!
//! # Metrics
//! - `proxy_requests_total` (counter): proxy requests by outcome
//! - `proxy_upstream_duration_seconds` (histogram): forwarding latency
//! - `proxy_unhandled_encoding_total` (counter): bodies passed through with an
//!   unknown `Content-Encoding`, by coding
//! - `static_requests_total` (counter): requests served from the document root
//!
//! # Design Decisions
//! - Without an installed recorder the macros are no-ops
//! - Low-overhead metric updates (atomic operations)

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::upstream::UpstreamOutcome;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one finished forwarding attempt.
pub fn record_outcome(outcome: &UpstreamOutcome, started: Instant) {
    metrics::counter!("proxy_requests_total", "outcome" => outcome.kind()).increment(1);
    metrics::histogram!("proxy_upstream_duration_seconds").record(started.elapsed().as_secs_f64());
    if let Some(coding) = outcome.unhandled_encoding() {
        metrics::counter!("proxy_unhandled_encoding_total", "encoding" => coding.to_string())
            .increment(1);
    }
}

/// Record one static file request.
pub fn record_static(status: u16) {
    metrics::counter!("static_requests_total", "status" => status.to_string()).increment(1);
}
