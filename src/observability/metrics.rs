//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define dispatch metrics (requests, latency, context pool reuse)
//! - Expose a Prometheus-compatible scrape endpoint
//!
//! # Metrics
//! - `waymark_requests_total` (counter): requests by method, status, route
//! - `waymark_request_duration_seconds` (histogram): dispatch latency
//! - `waymark_context_pool_total` (counter): context acquisitions by outcome
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; without an installed recorder
//!   every call is a no-op
//! - The route label is the registered pattern, never the raw path, to keep
//!   label cardinality bounded

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::{Method, StatusCode};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Route label for requests no route matched.
pub const UNMATCHED_ROUTE: &str = "none";

/// Install the Prometheus recorder and its HTTP listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one dispatched request.
pub fn record_request(method: &Method, status: StatusCode, route: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.as_u16().to_string()),
        ("route", route.to_string()),
    ];
    ::metrics::counter!("waymark_requests_total", &labels).increment(1);
    ::metrics::histogram!("waymark_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record a request that matched no route.
pub fn record_not_found(method: &Method, start: Instant) {
    record_request(method, StatusCode::NOT_FOUND, UNMATCHED_ROUTE, start);
}

/// Record whether a context came from the pool or was freshly allocated.
pub fn record_context_acquire(reused: bool) {
    let outcome = if reused { "reused" } else { "allocated" };
    ::metrics::counter!("waymark_context_pool_total", "outcome" => outcome).increment(1);
}
