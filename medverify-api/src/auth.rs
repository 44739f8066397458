//! Authentication and Authorization
//!
//! Admin endpoints (`/api/logs`, `/api/stats`) require either an API key or a
//! session token issued by `POST /api/admin/login`.
//!
//! ## API Key (Header)
//! ```text
//! X-API-Key: your-api-key-here
//! ```
//!
//! ## Bearer Token
//! ```text
//! Authorization: Bearer admin_token_...
//! ```
//!
//! # Configuration
//!
//! - `MEDVERIFY_AUTH_ENABLED`: Enable/disable authentication (default: true)
//! - `MEDVERIFY_ADMIN_USERNAME` / `MEDVERIFY_ADMIN_PASSWORD`: admin credentials
//! - `MEDVERIFY_API_KEYS`: Comma-separated API keys
//! - `MEDVERIFY_SESSION_TTL_SECS`: Session lifetime (default: 8 hours)

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;

/// Default session lifetime
pub const DEFAULT_SESSION_TTL_SECS: u64 = 8 * 60 * 60;

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Whether authentication is enforced
    pub enabled: bool,
    /// Admin username
    pub admin_username: String,
    /// Admin password
    pub admin_password: String,
    /// API keys (multiple keys supported)
    pub api_keys: Vec<String>,
    /// Session lifetime
    pub session_ttl_secs: u64,
    /// Path prefixes that require authentication
    pub protected_paths: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            admin_username: "admin".to_string(),
            admin_password: "admin123".to_string(),
            api_keys: Vec::new(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            protected_paths: vec!["/api/logs".to_string(), "/api/stats".to_string()],
        }
    }
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let enabled = std::env::var("MEDVERIFY_AUTH_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true);

        let api_keys: Vec<String> = std::env::var("MEDVERIFY_API_KEYS")
            .or_else(|_| std::env::var("MEDVERIFY_API_KEY"))
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            enabled,
            admin_username: std::env::var("MEDVERIFY_ADMIN_USERNAME")
                .unwrap_or(defaults.admin_username),
            admin_password: std::env::var("MEDVERIFY_ADMIN_PASSWORD")
                .unwrap_or(defaults.admin_password),
            api_keys,
            session_ttl_secs: std::env::var("MEDVERIFY_SESSION_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.session_ttl_secs),
            protected_paths: defaults.protected_paths,
        }
    }

    /// Check if a path requires authentication
    pub fn is_protected_path(&self, path: &str) -> bool {
        self.protected_paths
            .iter()
            .any(|p| path == p || path.starts_with(&format!("{}/", p)))
    }

    /// Validate an API key
    pub fn validate_api_key(&self, key: &str) -> bool {
        self.api_keys.iter().any(|k| k == key)
    }

    /// Check admin credentials
    pub fn check_credentials(&self, username: &str, password: &str) -> bool {
        !self.admin_password.is_empty()
            && username == self.admin_username
            && password == self.admin_password
    }
}

/// Authentication error response
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthErrorResponse {
    pub code: String,
    pub message: String,
}

impl AuthErrorResponse {
    pub fn unauthorized(message: &str) -> Self {
        Self {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
        }
    }
}

fn reject(message: &str) -> Response {
    crate::metrics::record_error("UNAUTHORIZED");
    (
        StatusCode::UNAUTHORIZED,
        Json(AuthErrorResponse::unauthorized(message)),
    )
        .into_response()
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let auth_config = &state.auth_config;

    // If auth is disabled, pass through
    if !auth_config.enabled {
        return next.run(request).await;
    }

    if !auth_config.is_protected_path(request.uri().path()) {
        return next.run(request).await;
    }

    // Try API Key authentication (X-API-Key header)
    if let Some(api_key) = request.headers().get("X-API-Key") {
        if let Ok(key) = api_key.to_str() {
            if auth_config.validate_api_key(key) {
                return next.run(request).await;
            }
        }
        return reject("Invalid API key");
    }

    // Try session token authentication
    if let Some(auth_header) = request.headers().get(AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                if state.validate_session(token.trim()).await {
                    return next.run(request).await;
                }
                return reject("Invalid or expired session token");
            }
        }
    }

    reject("Authentication required. Provide X-API-Key header or Authorization: Bearer <token>")
}
