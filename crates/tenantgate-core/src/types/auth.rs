//! Request and response bodies exchanged with the auth endpoints.

use serde::{Deserialize, Serialize};

/// Credentials posted to the login endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

/// Body posted to the signup endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// Account email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
    /// Requested username.
    pub username: String,
    /// Company to create alongside the account, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

/// Response of the login and signup endpoints.
///
/// `user` is kept loosely typed; it goes through claims normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Raw user payload.
    pub user: serde_json::Value,
}

/// Body posted to the refresh endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// Current refresh token.
    pub refresh_token: String,
}

/// Response of the refresh endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    /// New access token.
    pub access_token: String,
    /// Rotated refresh token, when the server rotates.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Body posted to the logout endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    /// Refresh token to invalidate.
    pub refresh_token: String,
}
