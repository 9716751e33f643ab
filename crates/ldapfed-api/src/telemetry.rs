//! Prometheus metrics for Ldapfed
//!
//! Exposes metrics at `/metrics` in Prometheus text format. Directory
//! counters are emitted by `ldapfed-auth`; this module adds HTTP metrics.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use ldapfed_core::{Error, Result};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use std::time::Instant;

/// Metric names
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "ldapfed_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "ldapfed_http_request_duration_seconds";
    pub const UPTIME_SECONDS: &str = "ldapfed_uptime_seconds";
    pub const INFO: &str = "ldapfed_info";
}

/// Handle on the installed Prometheus recorder
pub struct MetricsRecorder {
    handle: PrometheusHandle,
    start_time: Instant,
}

impl MetricsRecorder {
    /// Install the process-wide Prometheus recorder.
    ///
    /// Fails when another recorder is already installed.
    pub fn install() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| Error::Internal(format!("failed to install Prometheus recorder: {}", e)))?;

        gauge!(names::INFO, "version" => ldapfed_core::VERSION).set(1.0);

        Ok(Self {
            handle,
            start_time: Instant::now(),
        })
    }

    /// Metrics output in Prometheus format
    pub fn render(&self) -> String {
        gauge!(names::UPTIME_SECONDS).set(self.start_time.elapsed().as_secs_f64());
        self.handle.render()
    }
}

/// Record request count and latency per method, route and status
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = route_label(request.uri().path());

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    counter!(
        names::HTTP_REQUESTS_TOTAL,
        "method" => method.clone(),
        "route" => route,
        "status" => status
    )
    .increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, "method" => method)
        .record(start.elapsed().as_secs_f64());

    response
}

/// Collapse per-user paths so logins do not become label values
fn route_label(path: &str) -> &'static str {
    match path {
        "/health" => "/health",
        "/metrics" => "/metrics",
        "/api/admin/ldap/status" => "/api/admin/ldap/status",
        "/api/admin/ldap/authenticate" => "/api/admin/ldap/authenticate",
        p if p.starts_with("/api/admin/ldap/") => "/api/admin/ldap/{username}",
        _ => "other",
    }
}

/// GET /metrics
pub async fn metrics_handler(State(metrics): State<Arc<MetricsRecorder>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        metrics.render(),
    )
}
