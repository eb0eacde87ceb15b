//! Auth endpoints over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use tenantgate_core::config::ApiConfig;
use tenantgate_core::error::AppError;
use tenantgate_core::result::AppResult;
use tenantgate_core::traits::AuthApi;
use tenantgate_core::types::{
    AuthResponse, LoginRequest, LogoutRequest, RefreshRequest, RefreshResponse, SignupRequest,
};

use crate::error;

/// [`AuthApi`] backed by the remote auth endpoints.
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: Client,
    config: ApiConfig,
}

impl HttpAuthApi {
    /// Build a client for the configured endpoints.
    pub fn new(config: ApiConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    tenantgate_core::error::ErrorKind::Configuration,
                    "Failed to create HTTP client",
                    e,
                )
            })?;
        Ok(Self::with_client(client, config))
    }

    /// Use an existing `reqwest` client.
    pub fn with_client(client: Client, config: ApiConfig) -> Self {
        Self { client, config }
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(url = %url, "POST");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(error::from_transport)?;

        if !response.status().is_success() {
            return Err(error::from_response(response).await);
        }

        let value: Value = response.json().await.map_err(error::from_transport)?;
        Ok(serde_json::from_value(unwrap_envelope(value))?)
    }
}

/// Accept both bare bodies and `{ "success": .., "data": {..} }` envelopes.
fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.get("data").is_some_and(Value::is_object) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, credentials: &LoginRequest) -> AppResult<AuthResponse> {
        self.post(&self.config.login_path, credentials).await
    }

    async fn signup(&self, request: &SignupRequest) -> AppResult<AuthResponse> {
        self.post(&self.config.signup_path, request).await
    }

    async fn refresh(&self, refresh_token: &str) -> AppResult<RefreshResponse> {
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        self.post(&self.config.refresh_path, &body)
            .await
            .map_err(|e| {
                warn!(error = %e, "Refresh endpoint rejected the request");
                AppError::unauthorized(format!("Refresh rejected: {}", e.message))
            })
    }

    async fn logout(&self, refresh_token: &str) -> AppResult<()> {
        let body = LogoutRequest {
            refresh_token: refresh_token.to_string(),
        };
        let url = self.url(&self.config.logout_path);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(error::from_transport)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(error::from_response(response).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_envelope() {
        let wrapped = json!({ "success": true, "data": { "accessToken": "a" } });
        assert_eq!(unwrap_envelope(wrapped), json!({ "accessToken": "a" }));

        let bare = json!({ "accessToken": "a", "data": 3 });
        assert_eq!(unwrap_envelope(bare.clone()), bare);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let api = HttpAuthApi::new(ApiConfig {
            base_url: "http://localhost:9000/api/".to_string(),
            ..ApiConfig::default()
        })
        .unwrap();
        assert_eq!(api.url("/auth/login"), "http://localhost:9000/api/auth/login");
    }
}
