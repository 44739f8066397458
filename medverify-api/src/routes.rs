//! API Routes
//!
//! Route definitions for the verification API.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::auth_middleware;
use crate::handlers::*;
use crate::metrics::metrics_middleware;
use crate::state::AppState;

/// Create the `/api` router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let enable_cors = state.config.enable_cors;
    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let max_body_size = state.config.max_body_size;

    let mut router = Router::new()
        // Service info and health
        .route("/api", get(service_info))
        .route("/api/", get(service_info))
        .route("/api/health", get(health_check))
        // Consumer verification
        .route("/api/verify", post(verify_batch))
        // Admin
        .route("/api/admin/login", post(admin_login))
        .route("/api/logs", get(get_logs))
        .route("/api/stats", get(get_stats))
        .with_state(state.clone());

    // Authentication only guards the protected admin paths
    router = router.layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    router = router.layer(middleware::from_fn_with_state(state, metrics_middleware));

    router = router
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(TimeoutLayer::new(timeout));

    if enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router.layer(TraceLayer::new_for_http())
}

/// Build the full application router
pub fn build_app(state: AppState) -> Router {
    let state = Arc::new(state);

    let root_router = Router::new().route("/", get(|| async { "MedVerify API Service" }));

    let health_router = Router::new()
        .route("/healthz", get(health_check))
        .with_state(state.clone());

    root_router
        .merge(health_router)
        .merge(create_router(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{demo_state, demo_state_with};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use medverify_core::UnavailableScorer;
    use tower::util::ServiceExt;

    fn verify_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/verify")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_root_endpoint() {
        let app = build_app(demo_state());

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_healthz_endpoint() {
        let app = build_app(demo_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/healthz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_root_endpoint() {
        let app = build_app(demo_state());

        let response = app
            .oneshot(Request::builder().uri("/api/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_verify_endpoint() {
        let app = build_app(demo_state());

        let response = app
            .oneshot(verify_request(r#"{"code":"FAKE999999Z"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_verify_missing_code() {
        let app = build_app(demo_state());

        let response = app.oneshot(verify_request("{}")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_verify_without_model_is_unavailable() {
        let state = demo_state_with(Arc::new(UnavailableScorer::new("no model")));
        let app = build_app(state);

        let response = app
            .oneshot(verify_request(r#"{"code":"MED597233X"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_logs_require_auth() {
        let app = build_app(demo_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/logs")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_stats_with_api_key() {
        let mut auth = crate::auth::AuthConfig::default();
        auth.api_keys = vec!["test-key".to_string()];
        let app = build_app(demo_state().with_auth(auth));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/stats")
                    .header("X-API-Key", "test-key")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
