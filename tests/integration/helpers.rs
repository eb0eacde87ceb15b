//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};

use tenantgate::SessionManager;
use tenantgate::tenantgate_core::config::SessionConfig;
use tenantgate::tenantgate_core::error::AppError;
use tenantgate::tenantgate_core::result::AppResult;
use tenantgate::tenantgate_core::traits::{AuthApi, SessionStore};
use tenantgate::tenantgate_core::types::{
    AuthResponse, LoginRequest, RefreshResponse, SignupRequest,
};
use tenantgate::tenantgate_store::memory::MemorySessionStore;

/// Build a compact token whose payload carries `claims` plus an expiry
/// `ttl_seconds` from now.
pub fn token_with(claims: Value, ttl_seconds: i64) -> String {
    let mut payload = claims;
    payload["exp"] = json!(chrono::Utc::now().timestamp() + ttl_seconds);
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).expect("payload"));
    format!("{header}.{body}.c2lnbmF0dXJl")
}

/// Token for the standard test user.
pub fn token(seq: usize, ttl_seconds: i64) -> String {
    token_with(json!({ "sub": "user-1", "jti": seq }), ttl_seconds)
}

/// Login payload of the standard test user.
pub fn user() -> Value {
    json!({
        "userId": "user-1",
        "username": "grace",
        "email": "grace@example.com",
        "roles": ["admin"],
        "permissions": "\"write:users\"",
        "companyId": null,
        "subscriptionTier": "premium"
    })
}

/// Counting [`AuthApi`] double.
#[derive(Debug)]
pub struct MockAuthApi {
    pub refresh_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub refresh_delay: Duration,
    pub reject_refresh: bool,
    pub token_ttl: i64,
}

impl Default for MockAuthApi {
    fn default() -> Self {
        Self {
            refresh_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            refresh_delay: Duration::from_millis(50),
            reject_refresh: false,
            token_ttl: 3600,
        }
    }
}

impl MockAuthApi {
    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthApi for MockAuthApi {
    async fn login(&self, _credentials: &LoginRequest) -> AppResult<AuthResponse> {
        Ok(AuthResponse {
            access_token: token(0, self.token_ttl),
            refresh_token: "rt-0".to_string(),
            user: user(),
        })
    }

    async fn signup(&self, _request: &SignupRequest) -> AppResult<AuthResponse> {
        self.login(&LoginRequest::default()).await
    }

    async fn refresh(&self, refresh_token: &str) -> AppResult<RefreshResponse> {
        let seq = self.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.refresh_delay).await;
        if self.reject_refresh {
            return Err(AppError::unauthorized(format!(
                "Refresh token {refresh_token} revoked"
            )));
        }
        Ok(RefreshResponse {
            access_token: token(seq, self.token_ttl),
            refresh_token: Some(format!("rt-{seq}")),
        })
    }

    async fn logout(&self, _refresh_token: &str) -> AppResult<()> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        Err(AppError::service_unavailable("Auth server down"))
    }
}

/// Test session context
pub struct TestSession {
    pub manager: SessionManager,
    pub store: Arc<dyn SessionStore>,
    pub api: Arc<MockAuthApi>,
}

impl TestSession {
    /// A signed-out session over an in-memory store.
    pub fn new(api: MockAuthApi) -> Self {
        Self::with_store(Arc::new(MemorySessionStore::new()), api)
    }

    /// A signed-out session over `store`.
    pub fn with_store(store: Arc<dyn SessionStore>, api: MockAuthApi) -> Self {
        let api = Arc::new(api);
        let manager = SessionManager::new(store.clone(), api.clone(), SessionConfig::default());
        Self {
            manager,
            store,
            api,
        }
    }

    /// Sign in as the standard test user.
    pub async fn login(&self) -> String {
        self.manager
            .login(&LoginRequest::default())
            .await
            .expect("login")
            .access_token
            .clone()
    }
}
