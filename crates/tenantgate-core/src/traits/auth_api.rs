//! Auth endpoint collaborator trait.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::auth::{AuthResponse, LoginRequest, RefreshResponse, SignupRequest};

/// Remote authentication endpoints used by the session lifecycle.
///
/// Implementations map a rejected token or refresh token to
/// [`ErrorKind::Authentication`](crate::error::ErrorKind::Authentication)
/// and network trouble to
/// [`ErrorKind::ExternalService`](crate::error::ErrorKind::ExternalService).
#[async_trait]
pub trait AuthApi: Send + Sync + std::fmt::Debug + 'static {
    /// Exchange credentials for a token pair and user payload.
    async fn login(&self, credentials: &LoginRequest) -> AppResult<AuthResponse>;

    /// Create an account and return its first token pair.
    async fn signup(&self, request: &SignupRequest) -> AppResult<AuthResponse>;

    /// Exchange a refresh token for a new access token.
    ///
    /// Any non-success response must be reported as an error; the caller
    /// treats every refresh failure as terminal.
    async fn refresh(&self, refresh_token: &str) -> AppResult<RefreshResponse>;

    /// Invalidate a refresh token server-side.
    async fn logout(&self, refresh_token: &str) -> AppResult<()>;
}
