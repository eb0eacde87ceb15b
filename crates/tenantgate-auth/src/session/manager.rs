//! Session manager: owns the current session and its persisted copy.
//!
//! The manager is a cheap clonable handle. Every clone shares the same
//! session slot, refresh flight, state channel, and event channel, so the
//! background expiry watch and request paths observe one session.

use std::sync::Arc;

use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use tenantgate_core::config::SessionConfig;
use tenantgate_core::error::AppError;
use tenantgate_core::result::AppResult;
use tenantgate_core::traits::{AuthApi, SessionStore};
use tenantgate_core::types::{AuthResponse, LoginRequest, SignupRequest, UserClaims};
use tenantgate_store::SessionKeys;

use crate::claims::{claims_from_token, normalize_claims};

use super::single_flight::RefreshFlight;
use super::state::{Session, SessionEvent, SessionState, SignOutReason};

/// Capacity of the session event channel.
const EVENT_CAPACITY: usize = 32;

/// Shared state behind every [`SessionManager`] clone.
struct SessionInner {
    store: Arc<dyn SessionStore>,
    api: Arc<dyn AuthApi>,
    keys: SessionKeys,
    config: SessionConfig,
    current: RwLock<Option<Arc<Session>>>,
    /// Bumped on every sign-in and sign-out. Held while a session is
    /// committed or cleared so a refresh started under an older epoch
    /// cannot write over the result.
    epoch: Mutex<u64>,
    /// Access token last written to or loaded from the store.
    synced_token: RwLock<Option<String>>,
    flight: Arc<RefreshFlight>,
    state: watch::Sender<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

/// Handle to the client session lifecycle.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &self.state())
            .field("session", &self.current())
            .field("flight", &self.inner.flight)
            .finish()
    }
}

impl SessionManager {
    /// Create a signed-out manager over a store and an auth API.
    pub fn new(
        store: Arc<dyn SessionStore>,
        api: Arc<dyn AuthApi>,
        config: SessionConfig,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::SignedOut);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(SessionInner {
                keys: SessionKeys::new(&config.key_prefix),
                store,
                api,
                config,
                current: RwLock::new(None),
                epoch: Mutex::new(0),
                synced_token: RwLock::new(None),
                flight: Arc::new(RefreshFlight::new()),
                state,
                events,
            }),
        }
    }

    /// Session configuration in effect.
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.inner.state.borrow()
    }

    /// Watch lifecycle state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Receive session events (sign in, refresh, sign out).
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Current session, if any.
    pub fn current(&self) -> Option<Arc<Session>> {
        self.inner.current.read().clone()
    }

    /// Claims of the current session, if any.
    pub fn claims(&self) -> Option<UserClaims> {
        self.current().map(|session| session.claims.clone())
    }

    /// Current access token, if any.
    pub fn access_token(&self) -> Option<String> {
        self.current().map(|session| session.access_token.clone())
    }

    /// Whether a session is present.
    pub fn is_signed_in(&self) -> bool {
        self.inner.current.read().is_some()
    }

    /// Whether a refresh is outstanding.
    pub fn is_refresh_in_flight(&self) -> bool {
        self.inner.flight.is_in_flight()
    }

    /// Number of refreshes started by this manager.
    pub fn refreshes_started(&self) -> u64 {
        self.inner.flight.started()
    }

    /// Whether `expiry` falls within the configured lookahead window.
    pub fn is_expiring_soon(&self, expiry: chrono::DateTime<chrono::Utc>) -> bool {
        super::state::is_expiring_soon(expiry, self.inner.config.refresh_lookahead())
    }

    /// Restore the session from the persisted store.
    ///
    /// Makes no network calls. Missing or unreadable data leaves the
    /// manager signed out and clears whatever partial data was stored.
    pub fn hydrate(&self) -> SessionState {
        self.set_state(SessionState::Hydrating);

        let mut epoch = self.inner.epoch.lock();
        *epoch += 1;
        let state = match self.load_persisted() {
            Some(session) => {
                info!(user_id = %session.claims.user_id, "Session hydrated from store");
                self.replace(session);
                SessionState::Active
            }
            None => {
                debug!("No persisted session");
                self.clear_store();
                *self.inner.current.write() = None;
                SessionState::SignedOut
            }
        };
        drop(epoch);

        self.set_state(state);
        state
    }

    /// Sign in with credentials.
    pub async fn login(&self, credentials: &LoginRequest) -> AppResult<Arc<Session>> {
        info!(email = %credentials.email, "Signing in");
        let response = self.inner.api.login(credentials).await?;
        self.establish(response)
    }

    /// Create an account and sign in as it.
    pub async fn signup(&self, request: &SignupRequest) -> AppResult<Arc<Session>> {
        info!(email = %request.email, username = %request.username, "Signing up");
        let response = self.inner.api.signup(request).await?;
        self.establish(response)
    }

    /// Refresh the access token.
    ///
    /// Concurrent callers share one network refresh and observe the same
    /// outcome. The refresh runs in its own task, so a caller dropping
    /// this future does not abandon it. Any refresh failure signs the
    /// session out and yields a session-expired error.
    pub async fn refresh(&self) -> AppResult<Arc<Session>> {
        let manager = self.clone();
        let pending = self.inner.flight.join_or_start(move |ticket| {
            let task = tokio::spawn(async move {
                let _ticket = ticket;
                manager.perform_refresh().await
            });
            async move {
                task.await.unwrap_or_else(|e| {
                    Err(AppError::internal(format!("Refresh task failed: {e}")))
                })
            }
            .boxed()
        });
        pending.await
    }

    /// Refresh unless the token rejected by the server was already replaced.
    ///
    /// Used after an unauthorized response: if another caller refreshed in
    /// the meantime, the current session is returned without a new refresh.
    pub async fn refresh_if_stale(&self, rejected_token: &str) -> AppResult<Arc<Session>> {
        if let Some(current) = self.current()
            && current.access_token != rejected_token
        {
            debug!("Access token already rotated, skipping refresh");
            return Ok(current);
        }
        self.refresh().await
    }

    /// Sign out locally and invalidate the refresh token server-side.
    ///
    /// The local session is cleared before the server call, so it is gone
    /// even if the server is unreachable or this future is dropped.
    /// Returns the path the caller should be redirected to.
    pub async fn logout(&self) -> String {
        let refresh_token = self
            .current()
            .and_then(|session| session.refresh_token.clone())
            .or_else(|| self.read_key(&self.inner.keys.refresh_token));

        let redirect = self.sign_out(SignOutReason::UserLogout);

        if let Some(token) = refresh_token
            && let Err(e) = self.inner.api.logout(&token).await
        {
            debug!(error = %e, "Server-side logout failed, local session already cleared");
        }

        redirect
    }

    /// End the session: clear memory and store, notify, return the redirect.
    ///
    /// Only the call that actually removes a session emits
    /// [`SessionEvent::SignedOut`].
    pub(crate) fn sign_out(&self, reason: SignOutReason) -> String {
        self.end_session(None, reason);
        self.inner.config.signed_out_redirect.clone()
    }

    /// Sign out unless the session moved past `expected` epoch.
    fn end_session(&self, expected: Option<u64>, reason: SignOutReason) {
        let previous = {
            let mut epoch = self.inner.epoch.lock();
            if expected.is_some_and(|expected| expected != *epoch) {
                debug!(reason = %reason, "Session changed meanwhile, not signing out");
                return;
            }
            *epoch += 1;
            self.clear_store();
            self.inner.current.write().take()
        };
        self.set_state(SessionState::SignedOut);

        let Some(session) = previous else {
            debug!(reason = %reason, "Sign out with no active session");
            return;
        };
        info!(user_id = %session.claims.user_id, reason = %reason, "Signed out");
        let _ = self.inner.events.send(SessionEvent::SignedOut {
            reason,
            redirect_to: self.inner.config.signed_out_redirect.clone(),
        });
    }

    /// Adopt the persisted session when it differs from the one in memory.
    ///
    /// Returns `false` when the store no longer holds a session.
    pub(crate) fn sync_from_store(&self) -> bool {
        let Some(stored_token) = self.read_key(&self.inner.keys.access_token) else {
            return false;
        };

        if !self.store_rewritten(&stored_token) {
            return true;
        }

        match self.load_persisted() {
            Some(session) => {
                debug!(user_id = %session.claims.user_id, "Adopted session written out of band");
                self.replace(session);
                if self.state() == SessionState::SignedOut {
                    self.set_state(SessionState::Active);
                }
                true
            }
            None => false,
        }
    }

    async fn perform_refresh(&self) -> AppResult<Arc<Session>> {
        let epoch = *self.inner.epoch.lock();
        let previous = self.current();

        let Some(refresh_token) = self.refresh_token_for(previous.as_deref()) else {
            warn!("No refresh token available, signing out");
            self.end_session(Some(epoch), SignOutReason::RefreshFailed);
            return Err(AppError::session_expired("No refresh token available"));
        };

        self.set_state(SessionState::RefreshInFlight);
        debug!("Refreshing access token");

        let response = match self.inner.api.refresh(&refresh_token).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Token refresh failed, signing out");
                self.end_session(Some(epoch), SignOutReason::RefreshFailed);
                return Err(AppError::session_expired(format!(
                    "Session refresh failed: {}",
                    e.message
                )));
            }
        };

        let rotated_refresh = response.refresh_token.or(Some(refresh_token));
        let session = match previous {
            Some(previous) => previous.rotated(response.access_token, rotated_refresh),
            None => {
                let claims = self
                    .stored_claims()
                    .or_else(|| claims_from_token(&response.access_token));
                let Some(claims) = claims else {
                    warn!("Refreshed token carries no user claims, signing out");
                    self.end_session(Some(epoch), SignOutReason::RefreshFailed);
                    return Err(AppError::session_expired(
                        "Refreshed session has no user claims",
                    ));
                };
                Session::new(response.access_token, rotated_refresh, claims)
            }
        };

        let Some(session) = self.commit(Some(epoch), session) else {
            debug!("Session ended while refreshing, discarding rotated tokens");
            return Err(AppError::session_expired("Session ended while refreshing"));
        };
        self.set_state(SessionState::Active);
        info!(
            user_id = %session.claims.user_id,
            expires_at = ?session.expires_at,
            "Access token refreshed"
        );
        let _ = self.inner.events.send(SessionEvent::Refreshed {
            user_id: session.claims.user_id.clone(),
            expires_at: session.expires_at,
        });
        Ok(session)
    }

    fn establish(&self, response: AuthResponse) -> AppResult<Arc<Session>> {
        let claims = normalize_claims(&response.user)
            .or_else(|| claims_from_token(&response.access_token))
            .ok_or_else(|| AppError::unauthorized("Auth response carried no usable user claims"))?;

        let session = Session::new(
            response.access_token,
            Some(response.refresh_token),
            claims,
        );
        let Some(session) = self.commit(None, session) else {
            return Err(AppError::internal("Session commit was superseded"));
        };
        self.set_state(SessionState::Active);

        info!(user_id = %session.claims.user_id, tier = %session.claims.tier, "Signed in");
        let _ = self.inner.events.send(SessionEvent::SignedIn {
            user_id: session.claims.user_id.clone(),
        });
        Ok(session)
    }

    /// Persist and install `session` if the epoch still equals `expected`.
    ///
    /// `None` starts a new epoch unconditionally (sign-in).
    fn commit(&self, expected: Option<u64>, session: Session) -> Option<Arc<Session>> {
        let mut epoch = self.inner.epoch.lock();
        match expected {
            Some(expected) if expected != *epoch => return None,
            Some(_) => {}
            None => *epoch += 1,
        }
        self.persist_or_warn(&session);
        Some(self.replace(session))
    }

    /// Refresh token to present to the server.
    ///
    /// The in-memory token wins unless the store holds a session this
    /// manager did not write, since a failed persist can leave an already
    /// rotated token behind in the store.
    fn refresh_token_for(&self, previous: Option<&Session>) -> Option<String> {
        let keys = &self.inner.keys;
        let in_memory = previous.and_then(|session| session.refresh_token.clone());
        let rewritten = self
            .read_key(&keys.access_token)
            .is_some_and(|stored| self.store_rewritten(&stored));

        if rewritten || in_memory.is_none() {
            self.read_key(&keys.refresh_token).or(in_memory)
        } else {
            in_memory
        }
    }

    /// Whether the stored access token came from somewhere other than this manager.
    fn store_rewritten(&self, stored_token: &str) -> bool {
        let synced = self.inner.synced_token.read().as_deref() == Some(stored_token);
        let current = self
            .current()
            .is_some_and(|session| session.access_token == stored_token);
        !synced && !current
    }

    fn load_persisted(&self) -> Option<Session> {
        let keys = &self.inner.keys;
        let access_token = self.read_key(&keys.access_token)?;
        let refresh_token = self.read_key(&keys.refresh_token);
        let claims = self
            .stored_claims()
            .or_else(|| claims_from_token(&access_token))?;
        *self.inner.synced_token.write() = Some(access_token.clone());
        Some(Session::new(access_token, refresh_token, claims))
    }

    fn stored_claims(&self) -> Option<UserClaims> {
        let raw = self.read_key(&self.inner.keys.user)?;
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => normalize_claims(&value),
            Err(e) => {
                warn!(error = %e, "Stored user claims are not valid JSON");
                None
            }
        }
    }

    fn persist(&self, session: &Session) -> AppResult<()> {
        let keys = &self.inner.keys;
        let store = &self.inner.store;
        store.set(&keys.access_token, &session.access_token)?;
        match &session.refresh_token {
            Some(token) => store.set(&keys.refresh_token, token)?,
            None => store.delete(&keys.refresh_token)?,
        }
        store.set(&keys.user, &serde_json::to_string(&session.claims)?)?;
        *self.inner.synced_token.write() = Some(session.access_token.clone());
        Ok(())
    }

    fn persist_or_warn(&self, session: &Session) {
        if let Err(e) = self.persist(session) {
            warn!(error = %e, "Failed to persist session, keeping it in memory only");
        }
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.inner.store.get(key) {
            Ok(value) => value.filter(|v| !v.trim().is_empty()),
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read session store");
                None
            }
        }
    }

    fn clear_store(&self) {
        *self.inner.synced_token.write() = None;
        if let Err(e) = self.inner.store.delete_all(&self.inner.keys.all()) {
            warn!(error = %e, "Failed to clear persisted session");
        }
    }

    fn replace(&self, session: Session) -> Arc<Session> {
        let session = Arc::new(session);
        *self.inner.current.write() = Some(Arc::clone(&session));
        session
    }

    fn set_state(&self, state: SessionState) {
        let previous = self.inner.state.send_replace(state);
        if previous != state {
            debug!(from = %previous, to = %state, "Session state changed");
        }
    }
}
