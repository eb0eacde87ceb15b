//! Bearer-authenticated JSON client.
//!
//! Every request goes through [`SessionManager::with_auth_retry`], so an
//! expired access token is refreshed once (shared with any concurrent
//! request) and the request replayed with the new token.

use std::time::Duration;

use reqwest::{Client, Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use tenantgate_auth::SessionManager;
use tenantgate_core::config::ApiConfig;
use tenantgate_core::error::{AppError, ErrorKind};
use tenantgate_core::result::AppResult;

use crate::error;

/// JSON client that attaches the session's access token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionManager,
}

impl ApiClient {
    /// Build a client for `config.base_url` using `session` for tokens.
    pub fn new(config: &ApiConfig, session: SessionManager) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to create HTTP client", e)
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Session the client authenticates with.
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Perform a GET and decode the JSON response.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        self.send(Method::GET, path, None).await
    }

    /// Perform a POST with a JSON body and decode the JSON response.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.send(Method::POST, path, Some(body)).await
    }

    /// Perform a DELETE, ignoring any response body.
    pub async fn delete(&self, path: &str) -> AppResult<()> {
        let _: Value = self.send(Method::DELETE, path, None).await?;
        Ok(())
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> AppResult<T> {
        let url = format!("{}{}", self.base_url, path);

        let value = self
            .session
            .with_auth_retry(|token| {
                debug!(method = %method, url = %url, "Authenticated request");
                let mut request = self
                    .client
                    .request(method.clone(), &url)
                    .bearer_auth(token);
                if let Some(body) = &body {
                    request = request.json(body);
                }
                async move {
                    let response = request.send().await.map_err(error::from_transport)?;
                    read_json(response).await
                }
            })
            .await?;

        Ok(serde_json::from_value(value)?)
    }
}

/// Read a response body as JSON, treating an empty body as `null`.
async fn read_json(response: Response) -> AppResult<Value> {
    if !response.status().is_success() {
        return Err(error::from_response(response).await);
    }
    let text = response.text().await.map_err(error::from_transport)?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}
