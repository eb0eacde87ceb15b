//! Auth endpoint configuration.

use serde::{Deserialize, Serialize};

/// Location of the remote auth endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every path is joined to.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Login endpoint path.
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Signup endpoint path.
    #[serde(default = "default_signup_path")]
    pub signup_path: String,
    /// Refresh endpoint path.
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    /// Logout endpoint path.
    #[serde(default = "default_logout_path")]
    pub logout_path: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            login_path: default_login_path(),
            signup_path: default_signup_path(),
            refresh_path: default_refresh_path(),
            logout_path: default_logout_path(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_login_path() -> String {
    "/auth/login".to_string()
}

fn default_signup_path() -> String {
    "/auth/signup".to_string()
}

fn default_refresh_path() -> String {
    "/auth/refresh".to_string()
}

fn default_logout_path() -> String {
    "/auth/logout".to_string()
}

fn default_timeout() -> u64 {
    15
}
