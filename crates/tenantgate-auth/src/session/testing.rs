//! Test doubles for the session lifecycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use parking_lot::Mutex;
use serde_json::{Value, json};

use tenantgate_core::config::SessionConfig;
use tenantgate_core::error::AppError;
use tenantgate_core::result::AppResult;
use tenantgate_core::traits::{AuthApi, SessionStore};
use tenantgate_core::types::{AuthResponse, LoginRequest, RefreshResponse, SignupRequest};
use tenantgate_store::memory::MemorySessionStore;

use super::manager::SessionManager;

/// Build a token for `u-1` expiring `ttl_seconds` from now.
pub(crate) fn make_token(ttl_seconds: i64, seq: usize) -> String {
    let exp = chrono::Utc::now().timestamp() + ttl_seconds;
    let payload = json!({ "sub": "u-1", "username": "ada", "exp": exp, "jti": seq });
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap());
    format!("{header}.{body}.c2lnbmF0dXJl")
}

/// User payload as returned by the login endpoint.
pub(crate) fn user_payload() -> Value {
    json!({
        "id": "u-1",
        "username": "ada",
        "email": "ada@example.com",
        "roles": "[\"admin\"]",
        "permissions": ["read:users"],
        "tier": "pro"
    })
}

/// Scriptable [`AuthApi`] that counts its calls.
#[derive(Debug)]
pub(crate) struct MockAuthApi {
    login_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
    logout_calls: AtomicUsize,
    last_refresh_token: Mutex<Option<String>>,
    reject_refresh: bool,
    fail_logout: bool,
    refresh_delay: Option<Duration>,
    token_ttl: i64,
}

impl Default for MockAuthApi {
    fn default() -> Self {
        Self {
            login_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            last_refresh_token: Mutex::new(None),
            reject_refresh: false,
            fail_logout: false,
            refresh_delay: None,
            token_ttl: 3600,
        }
    }
}

impl MockAuthApi {
    pub(crate) fn rejecting_refresh() -> Self {
        Self {
            reject_refresh: true,
            ..Self::default()
        }
    }

    pub(crate) fn failing_logout() -> Self {
        Self {
            fail_logout: true,
            ..Self::default()
        }
    }

    pub(crate) fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = Some(delay);
        self
    }

    pub(crate) fn with_token_ttl(mut self, seconds: i64) -> Self {
        self.token_ttl = seconds;
        self
    }

    pub(crate) fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Refresh token presented by the most recent refresh call.
    pub(crate) fn last_refresh_token(&self) -> Option<String> {
        self.last_refresh_token.lock().clone()
    }

    pub(crate) fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst) + self.refresh_calls() + self.logout_calls()
    }

    fn issue(&self) -> AuthResponse {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        AuthResponse {
            access_token: make_token(self.token_ttl, 0),
            refresh_token: "refresh-0".to_string(),
            user: user_payload(),
        }
    }
}

#[async_trait]
impl AuthApi for MockAuthApi {
    async fn login(&self, _credentials: &LoginRequest) -> AppResult<AuthResponse> {
        Ok(self.issue())
    }

    async fn signup(&self, _request: &SignupRequest) -> AppResult<AuthResponse> {
        Ok(self.issue())
    }

    async fn refresh(&self, refresh_token: &str) -> AppResult<RefreshResponse> {
        *self.last_refresh_token.lock() = Some(refresh_token.to_string());
        let seq = self.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.refresh_delay {
            tokio::time::sleep(delay).await;
        }
        if self.reject_refresh {
            return Err(AppError::unauthorized("Refresh token rejected"));
        }
        Ok(RefreshResponse {
            access_token: make_token(self.token_ttl, seq),
            refresh_token: Some(format!("refresh-{seq}")),
        })
    }

    async fn logout(&self, _refresh_token: &str) -> AppResult<()> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_logout {
            return Err(AppError::external_service("Connection refused"));
        }
        Ok(())
    }
}

/// In-memory store whose writes can be made to fail.
#[derive(Debug, Clone, Default)]
pub(crate) struct FlakyStore {
    inner: MemorySessionStore,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyStore {
    pub(crate) fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }
}

impl SessionStore for FlakyStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::storage("No space left on device"));
        }
        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key)
    }
}

/// A manager over `store` and `api`.
pub(crate) fn manager_over(
    store: Arc<dyn SessionStore>,
    api: MockAuthApi,
) -> (SessionManager, Arc<MockAuthApi>) {
    let api = Arc::new(api);
    let manager = SessionManager::new(store, api.clone(), SessionConfig::default());
    (manager, api)
}

/// A manager over a fresh in-memory store and `api`.
pub(crate) fn manager_with(
    api: MockAuthApi,
) -> (SessionManager, MemorySessionStore, Arc<MockAuthApi>) {
    let store = MemorySessionStore::new();
    let (manager, api) = manager_over(Arc::new(store.clone()), api);
    (manager, store, api)
}
