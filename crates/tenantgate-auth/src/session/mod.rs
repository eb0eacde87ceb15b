//! Client session lifecycle: hydrate, login, refresh, retry, logout.

pub mod manager;
pub mod retry;
pub mod single_flight;
pub mod state;
pub mod watcher;

#[cfg(test)]
pub(crate) mod testing;

pub use manager::SessionManager;
pub use single_flight::RefreshFlight;
pub use state::{
    Session, SessionEvent, SessionState, SignOutReason, is_expiring_soon, is_expiring_soon_at,
};
pub use watcher::{ExpiryCheck, ExpiryWatch};
