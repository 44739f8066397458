//! Integration tests for the MedVerify API endpoints
//!
//! End-to-end verification flows over the demo catalogue, admin login and
//! the protected dashboard endpoints.

use axum::http::{header::AUTHORIZATION, HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::Utc;
use medverify_api::{build_app, AppState, AuthConfig};
use medverify_core::{AnomalyScorer, CoreResult, FeatureVector, UnavailableScorer};
use medverify_engine::{EngineConfig, VerificationEngine};
use medverify_store::{
    demo_records, MemoryEventLog, MemoryRegistry, DEMO_EXPIRED_CODE, DEMO_SUSPICIOUS_CODE,
    DEMO_VALID_CODE,
};
use serde_json::{json, Value};
use std::sync::Arc;

const API_KEY: &str = "integration-key";

/// Heavy, dispersed scanning is anomalous; everything else is ordinary
struct PatternScorer;

impl AnomalyScorer for PatternScorer {
    fn score(&self, features: &FeatureVector) -> CoreResult<f64> {
        if features.scan_count > 20.0 && features.distinct_regions >= 5.0 {
            Ok(0.2)
        } else {
            Ok(-0.1)
        }
    }

    fn model_version(&self) -> &str {
        "pattern-stub"
    }
}

/// Create test app state over the demo catalogue
fn create_test_state(scorer: Arc<dyn AnomalyScorer>) -> AppState {
    let records = demo_records(Utc::now().date_naive()).unwrap();
    let engine = VerificationEngine::new(
        Arc::new(MemoryRegistry::with_records(records)),
        Arc::new(MemoryEventLog::new()),
        scorer,
        EngineConfig::default(),
    );
    let auth = AuthConfig {
        api_keys: vec![API_KEY.to_string()],
        ..Default::default()
    };
    AppState::new(engine).with_auth(auth)
}

/// Create test server
fn create_test_server() -> TestServer {
    TestServer::new(build_app(create_test_state(Arc::new(PatternScorer)))).unwrap()
}

fn api_key() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-api-key"),
        HeaderValue::from_static(API_KEY),
    )
}

async fn verify(server: &TestServer, body: Value) -> Value {
    let response = server.post("/api/verify").json(&body).await;
    response.assert_status_ok();
    response.json()
}

// ============ Service Endpoint Tests ============

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();

    let response = server.get("/api/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_version"], "pattern-stub");
    assert_eq!(body["components"].as_array().map(|c| c.len()), Some(3));
}

#[tokio::test]
async fn test_health_degraded_without_model() {
    let state = create_test_state(Arc::new(UnavailableScorer::new("model file missing")));
    let server = TestServer::new(build_app(state)).unwrap();

    let response = server.get("/healthz").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn test_service_info() {
    let server = create_test_server();

    let response = server.get("/api/").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["service"], "medverify-api");
}

// ============ Verification Endpoint Tests ============

#[tokio::test]
async fn test_verify_genuine_batch() {
    let server = create_test_server();

    let body = verify(&server, json!({ "code": DEMO_VALID_CODE })).await;

    assert_eq!(body["status"], "Valid ✅");
    assert_eq!(body["status_code"], "valid");
    let confidence = body["confidence"].as_f64().unwrap();
    assert!((confidence - 0.95).abs() < 0.01);
    assert_eq!(body["batch_info"]["manufacturer"], "PharmaCorp");
    assert_eq!(body["batch_info"]["scan_count"], 3);
}

#[tokio::test]
async fn test_verify_normalizes_code() {
    let server = create_test_server();

    let body = verify(&server, json!({ "code": "  med597233x " })).await;

    assert_eq!(body["status_code"], "valid");
}

#[tokio::test]
async fn test_verify_unknown_batch() {
    let server = create_test_server();

    let body = verify(&server, json!({ "code": "FAKE999999Z" })).await;

    assert_eq!(body["status"], "Fake ❌");
    assert_eq!(body["confidence"], 1.0);
    assert!(body.get("batch_info").is_none());
}

#[tokio::test]
async fn test_verify_expired_batch() {
    let server = create_test_server();

    let body = verify(&server, json!({ "code": DEMO_EXPIRED_CODE })).await;

    assert_eq!(body["status"], "Expired ⚠️");
    assert_eq!(body["reason"], "Medicine expired 1 day ago");
}

#[tokio::test]
async fn test_verify_suspicious_batch() {
    let server = create_test_server();

    let body = verify(
        &server,
        json!({ "code": DEMO_SUSPICIOUS_CODE, "lat": -33.9, "lng": 151.2 }),
    )
    .await;

    assert_eq!(body["status"], "Suspected Counterfeit 🤔");
    assert!(body["confidence"].as_f64().unwrap() > 0.7);
}

#[tokio::test]
async fn test_verify_missing_code() {
    let server = create_test_server();

    let response = server.post("/api/verify").json(&json!({ "code": "  " })).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_verify_invalid_location() {
    let server = create_test_server();

    let response = server
        .post("/api/verify")
        .json(&json!({ "code": DEMO_VALID_CODE, "lat": 123.0, "lng": 10.0 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verify_without_model() {
    let state = create_test_state(Arc::new(UnavailableScorer::new("model file missing")));
    let server = TestServer::new(build_app(state)).unwrap();

    let response = server
        .post("/api/verify")
        .json(&json!({ "code": DEMO_VALID_CODE }))
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["code"], "SCORER_UNAVAILABLE");

    // Unknown codes never need the model
    let body = verify(&server, json!({ "code": "FAKE999999Z" })).await;
    assert_eq!(body["status_code"], "fake");
}

// ============ Admin Endpoint Tests ============

#[tokio::test]
async fn test_admin_login_success() {
    let server = create_test_server();

    let response = server
        .post("/api/admin/login")
        .json(&json!({ "username": "admin", "password": "admin123" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert!(body["token"].as_str().unwrap().starts_with("admin_token_"));
}

#[tokio::test]
async fn test_admin_login_failure() {
    let server = create_test_server();

    let response = server
        .post("/api/admin/login")
        .json(&json!({ "username": "admin", "password": "nope" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn test_logs_require_authentication() {
    let server = create_test_server();

    server
        .get("/api/logs")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .get("/api/stats")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer admin_token_forged"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logs_with_session_token() {
    let server = create_test_server();

    verify(&server, json!({ "code": DEMO_VALID_CODE })).await;
    verify(&server, json!({ "code": "FAKE999999Z" })).await;
    verify(&server, json!({ "code": "FAKE000000A" })).await;

    let login: Value = server
        .post("/api/admin/login")
        .json(&json!({ "username": "admin", "password": "admin123" }))
        .await
        .json();
    let token = login["token"].as_str().unwrap().to_string();
    let bearer = HeaderValue::from_str(&format!("Bearer {}", token)).unwrap();

    let response = server
        .get("/api/logs")
        .add_header(AUTHORIZATION, bearer.clone())
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["count"], 3);
    assert_eq!(body["logs"][0]["batch_code"], "FAKE000000A");
    assert_eq!(body["logs"][2]["status"], "valid");

    let response = server
        .get("/api/logs?status=fake&limit=1")
        .add_header(AUTHORIZATION, bearer)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["count"], 1);
    assert_eq!(body["logs"][0]["status"], "fake");
}

#[tokio::test]
async fn test_logs_reject_unknown_status() {
    let server = create_test_server();
    let (name, value) = api_key();

    server
        .get("/api/logs?status=bogus")
        .add_header(name, value)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats_with_api_key() {
    let server = create_test_server();
    let (name, value) = api_key();

    let empty: Value = server
        .get("/api/stats")
        .add_header(name.clone(), value.clone())
        .await
        .json();
    assert_eq!(empty["total_verifications"], 0);
    assert_eq!(empty["total_batches"], 3);
    for status in ["valid", "expired", "suspected", "fake"] {
        assert_eq!(empty["status_counts"][status], 0);
    }

    verify(&server, json!({ "code": DEMO_VALID_CODE })).await;
    verify(&server, json!({ "code": DEMO_EXPIRED_CODE })).await;
    verify(&server, json!({ "code": "FAKE999999Z" })).await;

    let response = server.get("/api/stats?days=7").add_header(name, value).await;
    response.assert_status_ok();
    let stats: Value = response.json();
    assert_eq!(stats["total_verifications"], 3);
    assert_eq!(stats["status_counts"]["valid"], 1);
    assert_eq!(stats["status_counts"]["expired"], 1);
    assert_eq!(stats["status_counts"]["fake"], 1);
    assert_eq!(stats["daily_counts"][0]["count"], 3);
}
