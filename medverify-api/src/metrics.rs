//! Prometheus Metrics
//!
//! # Metrics
//!
//! ## Counters
//! - `medverify_http_requests_total` - HTTP requests by method, path, status
//! - `medverify_verifications_total` - Verifications by status (recorded by the engine)
//! - `medverify_errors_total` - Errors by type
//! - `medverify_log_failures_total` - Failed log appends (recorded by the engine)
//!
//! ## Histograms
//! - `medverify_http_request_duration_seconds` - HTTP request duration
//!
//! ## Gauges
//! - `medverify_active_requests` - In-flight requests
//! - `medverify_uptime_seconds` - Service uptime
//!
//! # Configuration
//!
//! - `MEDVERIFY_METRICS_ENABLED`: Enable metrics (default: true)
//! - `MEDVERIFY_METRICS_PORT`: Exporter port (default: 9090)

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::state::AppState;

/// Metrics configuration
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are enabled
    pub enabled: bool,
    /// Port for the exporter endpoint
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 9090,
        }
    }
}

impl MetricsConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let enabled = std::env::var("MEDVERIFY_METRICS_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true);

        let port = std::env::var("MEDVERIFY_METRICS_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(9090);

        Self { enabled, port }
    }
}

/// Install the Prometheus exporter; call once at startup from within a runtime
pub fn init_metrics(config: &MetricsConfig) -> Result<(), String> {
    if !config.enabled {
        tracing::info!("Metrics disabled");
        return Ok(());
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install metrics recorder: {}", e))?;

    tracing::info!(port = config.port, "Metrics exporter listening");
    Ok(())
}

/// Record a request metric
pub fn record_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", normalize_path(path)),
        ("status", status.to_string()),
    ];

    counter!("medverify_http_requests_total", &labels).increment(1);
    histogram!("medverify_http_request_duration_seconds", &labels).record(duration_secs);
}

/// Record an error
pub fn record_error(error_type: &str) {
    counter!("medverify_errors_total", "type" => error_type.to_string()).increment(1);
}

/// Normalize path for metric labels; unknown routes collapse to one label
fn normalize_path(path: &str) -> String {
    const KNOWN: [&str; 9] = [
        "/",
        "/healthz",
        "/api",
        "/api/",
        "/api/health",
        "/api/verify",
        "/api/admin/login",
        "/api/logs",
        "/api/stats",
    ];

    if KNOWN.contains(&path) {
        path.to_string()
    } else {
        "other".to_string()
    }
}

/// Metrics middleware for tracking HTTP requests
pub async fn metrics_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    state.increment_requests().await;
    gauge!("medverify_active_requests").set(state.enter_request() as f64);
    gauge!("medverify_uptime_seconds").set(state.uptime_secs() as f64);

    let response = next.run(request).await;

    gauge!("medverify_active_requests").set(state.exit_request() as f64);
    let duration = start.elapsed().as_secs_f64();
    record_request(&method, &path, response.status().as_u16(), duration);

    response
}
