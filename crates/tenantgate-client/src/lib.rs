//! # tenantgate-client
//!
//! HTTP side of the TenantGate session lifecycle:
//!
//! - [`HttpAuthApi`]: the login, signup, refresh, and logout endpoints
//! - [`ApiClient`]: bearer-authenticated JSON requests that recover once
//!   from an expired access token

pub mod api;
pub mod auth;
pub mod error;

pub use api::ApiClient;
pub use auth::HttpAuthApi;
