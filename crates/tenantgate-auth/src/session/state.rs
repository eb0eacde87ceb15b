//! Session value, lifecycle states, and broadcast events.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use tenantgate_core::types::UserClaims;

use crate::claims::token_expiry;

/// The signed-in session. Replaced wholesale, never mutated in place.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// Bearer token presented on every request.
    pub access_token: String,
    /// Token exchanged for a new access token.
    pub refresh_token: Option<String>,
    /// Expiry read from the access token's `exp` claim.
    pub expires_at: Option<DateTime<Utc>>,
    /// Normalized claims of the signed-in user.
    pub claims: UserClaims,
}

impl Session {
    /// Build a session, deriving the expiry from the access token.
    pub fn new(access_token: String, refresh_token: Option<String>, claims: UserClaims) -> Self {
        let expires_at = token_expiry(&access_token);
        Self {
            access_token,
            refresh_token,
            expires_at,
            claims,
        }
    }

    /// A new session carrying a refreshed token pair and the same claims.
    ///
    /// The refresh token is rotated only when the server supplied one.
    pub fn rotated(&self, access_token: String, refresh_token: Option<String>) -> Self {
        Self::new(
            access_token,
            refresh_token.or_else(|| self.refresh_token.clone()),
            self.claims.clone(),
        )
    }

    /// Whether the access token expires within `lookahead`.
    ///
    /// A token without an `exp` claim never counts as expiring.
    pub fn is_expiring_soon(&self, lookahead: Duration) -> bool {
        self.expires_at
            .is_some_and(|expiry| is_expiring_soon_at(expiry, Utc::now(), lookahead))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.claims.user_id)
            .field("expires_at", &self.expires_at)
            .field("has_refresh_token", &self.refresh_token.is_some())
            .finish()
    }
}

/// True when `now` is inside the lookahead window before `expiry`.
pub fn is_expiring_soon_at(expiry: DateTime<Utc>, now: DateTime<Utc>, lookahead: Duration) -> bool {
    now >= expiry - lookahead
}

/// True when the current instant is inside the lookahead window before `expiry`.
pub fn is_expiring_soon(expiry: DateTime<Utc>, lookahead: Duration) -> bool {
    is_expiring_soon_at(expiry, Utc::now(), lookahead)
}

/// Lifecycle state of the session manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No session.
    SignedOut,
    /// Reading the persisted session.
    Hydrating,
    /// A session is available.
    Active,
    /// A token refresh is outstanding.
    RefreshInFlight,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SignedOut => write!(f, "signed_out"),
            Self::Hydrating => write!(f, "hydrating"),
            Self::Active => write!(f, "active"),
            Self::RefreshInFlight => write!(f, "refresh_in_flight"),
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignOutReason {
    /// The user logged out.
    UserLogout,
    /// The refresh endpoint rejected the refresh token or was unreachable.
    RefreshFailed,
    /// A request was still unauthorized after a successful refresh.
    SessionExpired,
    /// Another process cleared the persisted session.
    ExternalSignOut,
}

impl fmt::Display for SignOutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserLogout => write!(f, "user_logout"),
            Self::RefreshFailed => write!(f, "refresh_failed"),
            Self::SessionExpired => write!(f, "session_expired"),
            Self::ExternalSignOut => write!(f, "external_sign_out"),
        }
    }
}

/// Notifications for UI layers that route on session changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A session was established by login or signup.
    SignedIn {
        /// Signed-in user.
        user_id: String,
    },
    /// The token pair was replaced.
    Refreshed {
        /// Session owner.
        user_id: String,
        /// New access token expiry.
        expires_at: Option<DateTime<Utc>>,
    },
    /// The session ended.
    SignedOut {
        /// Why it ended.
        reason: SignOutReason,
        /// Where the caller should be sent.
        redirect_to: String,
    },
}
