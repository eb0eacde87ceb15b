//! Single-flight slot for the token refresh.
//!
//! The first caller starts the refresh and parks a shared handle in the
//! slot; every caller arriving while it is outstanding clones that handle
//! and awaits the same result. The slot is cleared when the refresh task
//! ends, including by panic.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use tracing::trace;

use tenantgate_core::result::AppResult;

use super::state::Session;

/// Result every waiter of one refresh observes.
pub type RefreshOutcome = AppResult<Arc<Session>>;

/// Handle awaited by all callers of one refresh.
pub type PendingRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

/// Holds at most one outstanding refresh.
#[derive(Default)]
pub struct RefreshFlight {
    /// The outstanding refresh, tagged with its flight id.
    slot: Mutex<Option<(u64, PendingRefresh)>>,
    /// Source of flight ids.
    next_id: AtomicU64,
    /// Number of refreshes started over the lifetime of this slot.
    started: AtomicU64,
}

impl std::fmt::Debug for RefreshFlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshFlight")
            .field("in_flight", &self.is_in_flight())
            .field("started", &self.started())
            .finish()
    }
}

impl RefreshFlight {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a refresh is outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Number of refreshes started so far.
    pub fn started(&self) -> u64 {
        self.started.load(Ordering::SeqCst)
    }

    /// Join the outstanding refresh, or start one with `start`.
    ///
    /// `start` runs under the slot lock and receives the [`FlightTicket`]
    /// that must be dropped when the refresh ends.
    pub fn join_or_start<F>(self: &Arc<Self>, start: F) -> PendingRefresh
    where
        F: FnOnce(FlightTicket) -> BoxFuture<'static, RefreshOutcome>,
    {
        let mut slot = self.slot.lock();
        if let Some((id, pending)) = slot.as_ref() {
            trace!(flight = id, "Joining outstanding refresh");
            return pending.clone();
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.started.fetch_add(1, Ordering::SeqCst);
        let ticket = FlightTicket {
            flight: Arc::clone(self),
            id,
        };
        let pending = start(ticket).shared();
        *slot = Some((id, pending.clone()));
        trace!(flight = id, "Started refresh");
        pending
    }

    fn finish(&self, id: u64) {
        let mut slot = self.slot.lock();
        if matches!(slot.as_ref(), Some((current, _)) if *current == id) {
            *slot = None;
            trace!(flight = id, "Refresh slot cleared");
        }
    }
}

/// Clears its flight from the slot when dropped.
#[derive(Debug)]
pub struct FlightTicket {
    flight: Arc<RefreshFlight>,
    id: u64,
}

impl Drop for FlightTicket {
    fn drop(&mut self) {
        self.flight.finish(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenantgate_core::error::AppError;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_flight() {
        let flight = Arc::new(RefreshFlight::new());
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let first = flight.join_or_start(move |ticket| {
            async move {
                let _ticket = ticket;
                let _ = release_rx.await;
                Err::<Arc<Session>, _>(AppError::session_expired("rejected"))
            }
            .boxed()
        });
        let second = flight.join_or_start(|_| panic!("second refresh must not start"));

        assert!(flight.is_in_flight());
        release_tx.send(()).unwrap();

        let (a, b) = tokio::join!(first, second);
        assert_eq!(a.unwrap_err().message, "rejected");
        assert_eq!(b.unwrap_err().message, "rejected");
        assert_eq!(flight.started(), 1);
        assert!(!flight.is_in_flight());
    }

    #[tokio::test]
    async fn test_new_flight_after_completion() {
        let flight = Arc::new(RefreshFlight::new());
        for _ in 0..2 {
            let pending = flight.join_or_start(|ticket| {
                async move {
                    drop(ticket);
                    Err::<Arc<Session>, _>(AppError::internal("done"))
                }
                .boxed()
            });
            assert!(pending.await.is_err());
        }
        assert_eq!(flight.started(), 2);
    }
}
