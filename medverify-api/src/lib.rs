//! MedVerify API - HTTP Interface Layer
//!
//! axum service exposing the verification engine.
//!
//! # Endpoints
//!
//! ## Service
//! - `GET /` - Plain-text banner
//! - `GET /healthz`, `GET /api/health` - Component health
//! - `GET /api/` - Service name and version
//!
//! ## Verification
//! - `POST /api/verify` - `{code, lat?, lng?}` → status, reason, confidence, batch info
//!
//! ## Admin
//! - `POST /api/admin/login` - Issue a session token
//! - `GET /api/logs?limit=&status=` - Recent verifications (authenticated)
//! - `GET /api/stats?days=` - Dashboard statistics (authenticated)
//!
//! # Usage Example
//!
//! ```ignore
//! use medverify_api::{build_app, ApiConfig, AppState};
//!
//! let state = AppState::with_config(ApiConfig::default(), engine);
//! let app = build_app(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8001").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod state;

// Re-export main types
pub use auth::{AuthConfig, AuthErrorResponse};
pub use dto::*;
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use metrics::{init_metrics, MetricsConfig};
pub use routes::{build_app, create_router};
pub use state::{ApiConfig, AppState, ComponentHealthCheck, HealthStatus};

/// API version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default API port
pub const DEFAULT_PORT: u16 = 8001;

/// Start the API server; returns on Ctrl-C
pub async fn start_server(state: AppState) -> Result<(), std::io::Error> {
    let addr = state.config.listen_addr.clone();
    let app = build_app(state);

    tracing::info!("Starting MedVerify API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::demo_state;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_default_port() {
        assert_eq!(DEFAULT_PORT, 8001);
    }

    #[test]
    fn test_api_config_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.listen_addr, "0.0.0.0:8001");
        assert!(config.enable_cors);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_build_app() {
        let _app = build_app(demo_state());
    }

    #[test]
    fn test_health_status_values() {
        assert_eq!(HealthStatus::Healthy.as_str(), "healthy");
        assert_eq!(HealthStatus::Degraded.as_str(), "degraded");
        assert_eq!(HealthStatus::Unhealthy.as_str(), "unhealthy");
    }
}
