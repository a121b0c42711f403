//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by handler, method, status
//! - `http_request_duration_seconds` (histogram): latency by handler
//!
//! Recording is a no-op until [`init_metrics`] installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics recorder"),
    }
}

/// Record one observed handler invocation.
pub fn record_request(handler: &'static str, method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "http_requests_total",
        "handler" => handler,
        "method" => method.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
    metrics::histogram!("http_request_duration_seconds", "handler" => handler)
        .record(start.elapsed().as_secs_f64());
}
