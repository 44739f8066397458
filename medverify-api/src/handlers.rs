//! API Handlers
//!
//! HTTP handler implementations for the verification endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use medverify_core::VerificationStatus;
use medverify_engine::{VerificationRequest, DEFAULT_STATS_DAYS};
use medverify_store::{LogQuery, DEFAULT_LOG_LIMIT, MAX_LOG_LIMIT};
use std::sync::Arc;

use crate::dto::*;
use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, ComponentHealthCheck, HealthStatus};

/// Service root
pub async fn service_info(State(state): State<Arc<AppState>>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: state.config.service_name.clone(),
        version: state.config.version.clone(),
        message: "Medicine batch verification API".to_string(),
    })
}

/// Health check handler
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResult<Json<HealthResponse>> {
    let health = state.engine.health().await;

    let check = |name: &str, component: &medverify_engine::ComponentHealth| {
        if component.healthy {
            ComponentHealthCheck::healthy(name)
        } else {
            ComponentHealthCheck::unhealthy(
                name,
                component.message.clone().unwrap_or_default(),
            )
        }
    };
    let components = vec![
        check("registry", &health.registry),
        check("log", &health.log),
        check("scorer", &health.scorer),
    ];

    // Without the registry nothing can be verified; a missing model still allows Fake/Expired
    let overall_status = if components.iter().all(|c| c.status == HealthStatus::Healthy) {
        HealthStatus::Healthy
    } else if !health.registry.healthy {
        HealthStatus::Unhealthy
    } else {
        HealthStatus::Degraded
    };

    Ok(Json(HealthResponse {
        status: overall_status.as_str().to_string(),
        version: state.config.version.clone(),
        uptime_secs: state.uptime_secs(),
        model_version: health.model_version,
        components: components
            .into_iter()
            .map(|c| ComponentHealth {
                name: c.name,
                status: c.status.as_str().to_string(),
                message: c.message,
            })
            .collect(),
    }))
}

/// Verify a batch code
pub async fn verify_batch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VerifyRequest>,
) -> ApiResult<Json<VerifyResponse>> {
    let code = request
        .code
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Batch code is required"))?;

    let outcome = state
        .engine
        .verify(VerificationRequest {
            code,
            latitude: request.lat,
            longitude: request.lng,
        })
        .await?;

    Ok(Json(VerifyResponse::from(outcome)))
}

/// Admin login
///
/// Invalid credentials answer 200 with `success: false`.
pub async fn admin_login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Json<LoginResponse> {
    if !state
        .auth_config
        .check_credentials(&request.username, &request.password)
    {
        tracing::warn!(username = %request.username, "Admin login rejected");
        return Json(LoginResponse {
            success: false,
            message: "Invalid credentials".to_string(),
            token: None,
            expires_at: None,
        });
    }

    let (token, expires_at) = state.create_session().await;
    tracing::info!(username = %request.username, "Admin session issued");

    Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token: Some(token),
        expires_at: Some(expires_at),
    })
}

/// Recent verification events, newest first
pub async fn get_logs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LogsQuery>,
) -> ApiResult<Json<LogsResponse>> {
    let limit = params.limit.unwrap_or(DEFAULT_LOG_LIMIT);
    if limit == 0 {
        return Err(ApiError::validation("limit must be at least 1"));
    }

    let mut query = LogQuery::recent(limit.min(MAX_LOG_LIMIT));
    if let Some(status) = params.status.as_deref().filter(|s| !s.trim().is_empty()) {
        let status = VerificationStatus::from_str(status)
            .ok_or_else(|| ApiError::validation(format!("Unknown status: {}", status)))?;
        query = query.with_status(status);
    }

    let logs: Vec<LogEntryDto> = state
        .engine
        .recent_events(&query)
        .await?
        .into_iter()
        .map(LogEntryDto::from)
        .collect();

    Ok(Json(LogsResponse {
        count: logs.len(),
        logs,
    }))
}

/// Dashboard statistics
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StatsQuery>,
) -> ApiResult<Json<StatsResponse>> {
    let days = params.days.unwrap_or(DEFAULT_STATS_DAYS);
    let snapshot = state.engine.stats(Some(days), Utc::now()).await?;
    Ok(Json(StatsResponse::from(snapshot)))
}
