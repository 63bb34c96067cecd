//! Metrics collection and exposition.
//!
//! # Metrics
//! - `prerender_proxy_requests_total` (counter): requests by method, status, served_by
//! - `prerender_proxy_request_duration_seconds` (histogram): latency by served_by
//! - `prerender_proxy_cache_lookups_total` (counter): store lookups by outcome
//! - `prerender_proxy_classifications_total` (counter): requests by bot=true|false
//! - `prerender_proxy_upstream_errors_total` (counter): upstream failures by kind
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, so tests need no setup
//! - Prometheus exposition is opt-in via `observability.metrics_enabled`

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a finished request.
pub fn record_request(method: &str, status: u16, served_by: &'static str, start: Instant) {
    ::metrics::counter!(
        "prerender_proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "served_by" => served_by,
    )
    .increment(1);

    ::metrics::histogram!(
        "prerender_proxy_request_duration_seconds",
        "served_by" => served_by,
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of a snapshot store lookup.
pub fn record_cache_lookup(outcome: &'static str) {
    ::metrics::counter!("prerender_proxy_cache_lookups_total", "outcome" => outcome).increment(1);
}

/// Record a crawler classification.
pub fn record_classification(bot: bool) {
    let bot = if bot { "true" } else { "false" };
    ::metrics::counter!("prerender_proxy_classifications_total", "bot" => bot).increment(1);
}

/// Record an upstream failure (`transport`, `timeout`, `body`, `stalled`).
pub fn record_upstream_error(kind: &'static str) {
    ::metrics::counter!("prerender_proxy_upstream_errors_total", "kind" => kind).increment(1);
}
