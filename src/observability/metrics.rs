//! Metrics collection and exposition.
//!
//! # Metrics
//! - `fileserver_requests_total` (counter): requests by method, route, status
//! - `fileserver_request_duration_seconds` (histogram): time to response head
//! - `fileserver_listing_lines_total` (counter): emitted listing lines by type
//! - `fileserver_listing_aborted_total` (counter): listings cut short by the client
//! - `fileserver_active_listings` (gauge): listing producers still running
//!
//! Recording without an installed exporter is a no-op, so handlers record
//! unconditionally.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    metrics::counter!(
        "fileserver_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "fileserver_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_listing_lines(file_type: &'static str, lines: u64) {
    metrics::counter!("fileserver_listing_lines_total", "type" => file_type).increment(lines);
}

pub fn record_listing_aborted() {
    metrics::counter!("fileserver_listing_aborted_total").increment(1);
}

pub fn set_active_listings(count: u64) {
    metrics::gauge!("fileserver_active_listings").set(count as f64);
}

/// Middleware recording request count and latency per matched route.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    record_request(&method, &route, response.status().as_u16(), start);
    response
}
