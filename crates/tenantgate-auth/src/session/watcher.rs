//! Background expiry watch.
//!
//! Periodically re-reads the persisted session and refreshes the access
//! token once it enters the lookahead window. Each tick checks the
//! freshest persisted token, so a login or refresh performed by another
//! process is adopted instead of refreshed again.

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::manager::SessionManager;
use super::state::SignOutReason;

/// Outcome of one expiry check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryCheck {
    /// There is no session to watch.
    SignedOut,
    /// The access token is outside the lookahead window.
    Fresh,
    /// A refresh was already outstanding.
    AlreadyRefreshing,
    /// The token was refreshed.
    Refreshed,
    /// The refresh failed and the session was ended.
    RefreshFailed,
}

/// Handle to a running expiry watch. Dropping it stops the watch.
#[derive(Debug)]
pub struct ExpiryWatch {
    cancel: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl ExpiryWatch {
    /// Stop the watch and wait for its task to exit.
    pub async fn stop(self) {
        let _ = self.cancel.send(true);
        if let Err(e) = self.handle.await {
            warn!(error = %e, "Expiry watch task ended abnormally");
        }
    }

    /// Whether the watch task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl SessionManager {
    /// Start the periodic expiry watch on the current runtime.
    pub fn schedule_expiry_watch(&self) -> ExpiryWatch {
        let (cancel, mut cancel_rx) = watch::channel(false);
        let manager = self.clone();
        let period = self.config().expiry_check_interval();

        info!(interval_secs = period.as_secs(), "Starting session expiry watch");

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    changed = cancel_rx.changed() => {
                        if changed.is_err() || *cancel_rx.borrow() {
                            break;
                        }
                    }
                    _ = interval.tick() => {
                        let outcome = manager.check_expiry().await;
                        debug!(outcome = ?outcome, "Expiry check complete");
                    }
                }
            }

            debug!("Session expiry watch stopped");
        });

        ExpiryWatch { cancel, handle }
    }

    /// Run one expiry check against the freshest persisted session.
    pub async fn check_expiry(&self) -> ExpiryCheck {
        if !self.sync_from_store() {
            if self.is_signed_in() {
                info!("Persisted session was cleared externally");
                self.sign_out(SignOutReason::ExternalSignOut);
            }
            return ExpiryCheck::SignedOut;
        }

        let Some(session) = self.current() else {
            return ExpiryCheck::SignedOut;
        };
        let Some(expires_at) = session.expires_at else {
            return ExpiryCheck::Fresh;
        };
        if !self.is_expiring_soon(expires_at) {
            return ExpiryCheck::Fresh;
        }
        if self.is_refresh_in_flight() {
            return ExpiryCheck::AlreadyRefreshing;
        }

        debug!(expires_at = %expires_at, "Access token expiring soon");
        match self.refresh().await {
            Ok(_) => ExpiryCheck::Refreshed,
            Err(e) => {
                warn!(error = %e, "Scheduled refresh failed");
                ExpiryCheck::RefreshFailed
            }
        }
    }
}
