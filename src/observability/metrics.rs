//! Metrics collection and exposition.
//!
//! # Metrics
//! - `redirector_requests_total` (counter): requests by method, stage, status
//! - `redirector_resolve_duration_seconds` (histogram): time spent resolving
//!
//! # Design Decisions
//! - Recording is a no-op until the Prometheus exporter is installed
//! - Labels are low-cardinality: no paths or targets, and methods outside
//!   the standard set are counted as `other`

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::Method;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::routing::MatchStage;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Label value for `method`. Extension methods are any token a client
/// cares to send, so they share one bucket.
pub fn method_label(method: &Method) -> &'static str {
    match method.as_str() {
        "GET" => "GET",
        "HEAD" => "HEAD",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        "CONNECT" => "CONNECT",
        "OPTIONS" => "OPTIONS",
        "TRACE" => "TRACE",
        "PATCH" => "PATCH",
        _ => "other",
    }
}

/// Record one resolved request.
pub fn record_resolution(method: &Method, stage: MatchStage, status: u16, start: Instant) {
    counter!(
        "redirector_requests_total",
        "method" => method_label(method),
        "stage" => stage.as_str(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!("redirector_resolve_duration_seconds", "stage" => stage.as_str())
        .record(start.elapsed().as_secs_f64());
}
