//! Collaborator traits implemented outside the decision core.

pub mod auth_api;
pub mod session_store;

pub use auth_api::AuthApi;
pub use session_store::SessionStore;
