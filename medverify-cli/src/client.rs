//! API Client
//!
//! HTTP client for communicating with the MedVerify API.

use crate::commands::admin::AuthArgs;
use crate::error::{CliError, CliResult};
use medverify_api::{
    ErrorResponse, HealthResponse, LoginRequest, LoginResponse, LogsResponse, StatsResponse,
    VerifyRequest, VerifyResponse,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// MedVerify API client
pub struct MedVerifyClient {
    /// HTTP client
    client: Client,
    /// Base URL
    base_url: String,
}

impl MedVerifyClient {
    /// Create a new client
    pub fn new(base_url: impl Into<String>) -> CliResult<Self> {
        Self::with_timeout(base_url, 30)
    }

    /// Create with custom timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout_secs: u64) -> CliResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CliError::connection(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Get health status
    pub async fn health(&self) -> CliResult<HealthResponse> {
        let url = format!("{}/api/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        parse(response).await
    }

    /// Verify a batch code
    pub async fn verify(&self, request: VerifyRequest) -> CliResult<VerifyResponse> {
        let url = format!("{}/api/verify", self.base_url);
        let response = self.client.post(&url).json(&request).send().await?;
        parse(response).await
    }

    /// Log in as admin
    pub async fn login(&self, request: LoginRequest) -> CliResult<LoginResponse> {
        let url = format!("{}/api/admin/login", self.base_url);
        let response = self.client.post(&url).json(&request).send().await?;
        parse(response).await
    }

    /// Recent verification events
    pub async fn logs(
        &self,
        limit: Option<usize>,
        status: Option<&str>,
        auth: &AuthArgs,
    ) -> CliResult<LogsResponse> {
        let url = format!("{}/api/logs", self.base_url);
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(status) = status {
            query.push(("status", status.to_string()));
        }

        let request = authorize(self.client.get(&url).query(&query), auth);
        parse(request.send().await?).await
    }

    /// Dashboard statistics
    pub async fn stats(&self, days: Option<u32>, auth: &AuthArgs) -> CliResult<StatsResponse> {
        let url = format!("{}/api/stats", self.base_url);
        let mut request = self.client.get(&url);
        if let Some(days) = days {
            request = request.query(&[("days", days)]);
        }

        parse(authorize(request, auth).send().await?).await
    }
}

/// Attach whichever credential was supplied
fn authorize(request: RequestBuilder, auth: &AuthArgs) -> RequestBuilder {
    let request = match &auth.api_key {
        Some(key) => request.header("X-API-Key", key),
        None => request,
    };
    match &auth.token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

async fn parse<T: DeserializeOwned>(response: Response) -> CliResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    Err(CliError::api(status.as_u16(), error_message(&body)))
}

/// Prefer the structured error message over the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| format!("{}: {}", e.code, e.message))
        .unwrap_or_else(|_| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = MedVerifyClient::new("http://localhost:8001/").unwrap();
        assert_eq!(client.base_url, "http://localhost:8001");
    }

    #[test]
    fn test_error_message_from_error_body() {
        let body = r#"{"code":"SCORER_UNAVAILABLE","message":"Anomaly model is not loaded"}"#;
        assert_eq!(
            error_message(body),
            "SCORER_UNAVAILABLE: Anomaly model is not loaded"
        );
    }

    #[test]
    fn test_error_message_from_plain_body() {
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_verify_request_without_location() {
        let request = VerifyRequest {
            code: Some("MED597233X".to_string()),
            lat: None,
            lng: None,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("MED597233X"));
        assert!(!json.contains("lat"));
    }

    #[test]
    fn test_health_response_deserialization() {
        let json = r#"{
            "status": "degraded",
            "version": "0.1.0",
            "uptime_secs": 3600,
            "model_version": "unavailable",
            "components": [
                {"name": "scorer", "status": "unhealthy", "message": "model file missing"}
            ]
        }"#;

        let response: HealthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, "degraded");
        assert_eq!(response.components.len(), 1);
    }
}
