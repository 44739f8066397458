//! Application State
//!
//! Shared state for the verification service: engine, configuration and the
//! admin session table.

use chrono::{DateTime, Duration, Utc};
use medverify_engine::VerificationEngine;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::AuthConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Service name
    pub service_name: String,
    /// Service version
    pub version: String,
    /// Listen address
    pub listen_addr: String,
    /// Enable CORS
    pub enable_cors: bool,
    /// Request timeout (seconds)
    pub request_timeout_secs: u64,
    /// Max request body size (bytes)
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            service_name: "medverify-api".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            listen_addr: "0.0.0.0:8001".to_string(),
            enable_cors: true,
            request_timeout_secs: 30,
            max_body_size: 64 * 1024,
        }
    }
}

impl ApiConfig {
    /// Create from environment variables
    ///
    /// - `MEDVERIFY_LISTEN_ADDR`
    /// - `MEDVERIFY_CORS_ENABLED`
    /// - `MEDVERIFY_REQUEST_TIMEOUT_SECS`
    /// - `MEDVERIFY_MAX_BODY_SIZE`
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            listen_addr: std::env::var("MEDVERIFY_LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            enable_cors: std::env::var("MEDVERIFY_CORS_ENABLED")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.enable_cors),
            request_timeout_secs: std::env::var("MEDVERIFY_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
            max_body_size: std::env::var("MEDVERIFY_MAX_BODY_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_body_size),
            ..defaults
        }
    }
}

/// Application state shared across handlers
pub struct AppState {
    /// Configuration
    pub config: ApiConfig,
    /// Authentication configuration
    pub auth_config: AuthConfig,
    /// Verification engine
    pub engine: Arc<VerificationEngine>,
    /// Service start time
    pub started_at: DateTime<Utc>,
    /// Request counter
    request_counter: RwLock<u64>,
    /// In-flight requests
    active_requests: AtomicU64,
    /// Admin session token → expiry
    sessions: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl AppState {
    /// Create new application state with default config
    pub fn new(engine: VerificationEngine) -> Self {
        Self::with_config(ApiConfig::default(), engine)
    }

    /// Create with configuration
    pub fn with_config(config: ApiConfig, engine: VerificationEngine) -> Self {
        Self {
            config,
            auth_config: AuthConfig::default(),
            engine: Arc::new(engine),
            started_at: Utc::now(),
            request_counter: RwLock::new(0),
            active_requests: AtomicU64::new(0),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Set authentication configuration
    pub fn with_auth(mut self, auth_config: AuthConfig) -> Self {
        self.auth_config = auth_config;
        self
    }

    /// Get service uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        let now = Utc::now();
        (now - self.started_at).num_seconds().max(0) as u64
    }

    /// Increment request counter
    pub async fn increment_requests(&self) -> u64 {
        let mut counter = self.request_counter.write().await;
        *counter += 1;
        *counter
    }

    /// Get request count
    pub async fn request_count(&self) -> u64 {
        *self.request_counter.read().await
    }

    /// Mark a request as started; returns the in-flight count
    pub fn enter_request(&self) -> u64 {
        self.active_requests.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Mark a request as finished; returns the in-flight count
    pub fn exit_request(&self) -> u64 {
        self.active_requests
            .fetch_sub(1, Ordering::Relaxed)
            .saturating_sub(1)
    }

    // ============================================
    // Admin Sessions
    // ============================================

    /// Issue a new admin session token
    pub async fn create_session(&self) -> (String, DateTime<Utc>) {
        let token = format!("admin_token_{}", uuid::Uuid::new_v4().simple());
        let expires_at = Utc::now() + Duration::seconds(self.auth_config.session_ttl_secs as i64);

        let mut sessions = self.sessions.write().await;
        let now = Utc::now();
        sessions.retain(|_, expiry| *expiry > now);
        sessions.insert(token.clone(), expires_at);

        (token, expires_at)
    }

    /// Whether a session token is known and unexpired
    pub async fn validate_session(&self, token: &str) -> bool {
        let sessions = self.sessions.read().await;
        sessions
            .get(token)
            .map(|expiry| *expiry > Utc::now())
            .unwrap_or(false)
    }
}

/// Health status of the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Service is healthy
    Healthy,
    /// Service is degraded but functional
    Degraded,
    /// Service is unhealthy
    Unhealthy,
}

impl HealthStatus {
    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
        }
    }
}

/// Component health check result
#[derive(Debug, Clone)]
pub struct ComponentHealthCheck {
    /// Component name
    pub name: String,
    /// Health status
    pub status: HealthStatus,
    /// Optional message
    pub message: Option<String>,
}

impl ComponentHealthCheck {
    /// Create a healthy result
    pub fn healthy(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: HealthStatus::Healthy,
            message: None,
        }
    }

    /// Create an unhealthy result
    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: HealthStatus::Unhealthy,
            message: Some(message.into()),
        }
    }
}
