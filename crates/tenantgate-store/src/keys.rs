//! Key builders for every persisted session entry.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the session lifecycle uses.

/// Resolved persisted keys for one key prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKeys {
    /// Key holding the access token.
    pub access_token: String,
    /// Key holding the refresh token.
    pub refresh_token: String,
    /// Key holding the serialized user claims.
    pub user: String,
}

impl SessionKeys {
    /// Build the key set for `prefix`.
    pub fn new(prefix: &str) -> Self {
        Self {
            access_token: access_token(prefix),
            refresh_token: refresh_token(prefix),
            user: user(prefix),
        }
    }

    /// Every key, for wholesale deletion.
    pub fn all(&self) -> [&str; 3] {
        [&self.access_token, &self.refresh_token, &self.user]
    }
}

impl Default for SessionKeys {
    fn default() -> Self {
        Self::new("tenantgate")
    }
}

/// Key for the access token.
pub fn access_token(prefix: &str) -> String {
    format!("{prefix}:session:access_token")
}

/// Key for the refresh token.
pub fn refresh_token(prefix: &str) -> String {
    format!("{prefix}:session:refresh_token")
}

/// Key for the serialized user claims.
pub fn user(prefix: &str) -> String {
    format!("{prefix}:session:user")
}
