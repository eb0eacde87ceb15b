//! Authenticated request wrapper with one refresh-and-retry.

use std::future::Future;

use tracing::{debug, warn};

use tenantgate_core::error::AppError;
use tenantgate_core::result::AppResult;

use super::manager::SessionManager;
use super::state::SignOutReason;

impl SessionManager {
    /// Run `operation` with the current access token, recovering once from
    /// an expired token.
    ///
    /// - An unauthorized result triggers a refresh (shared with any other
    ///   caller refreshing at the same time) and a single retry with the
    ///   new token. A second unauthorized result ends the session.
    /// - A transient failure is retried once with the same session.
    /// - A cancelled operation is returned as-is and never retried.
    ///
    /// Each call performs at most one refresh and at most one retry.
    pub async fn with_auth_retry<T, F, Fut>(&self, operation: F) -> AppResult<T>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let Some(token) = self.access_token() else {
            return Err(AppError::unauthorized("Not signed in"));
        };

        let err = match operation(token.clone()).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if err.is_cancelled() {
            return Err(err);
        }

        if err.is_unauthorized() {
            debug!("Request unauthorized, refreshing session");
            let session = self.refresh_if_stale(&token).await?;

            return match operation(session.access_token.clone()).await {
                Err(e) if e.is_unauthorized() => {
                    warn!("Request still unauthorized after refresh, signing out");
                    self.sign_out(SignOutReason::SessionExpired);
                    Err(AppError::session_expired("Session expired"))
                }
                other => other,
            };
        }

        if err.is_transient() {
            debug!(error = %err, "Transient request failure, retrying once");
            let token = self.access_token().unwrap_or(token);
            return operation(token).await;
        }

        Err(err)
    }
}
