//! Shared domain types used across TenantGate crates.

pub mod auth;
pub mod claims;
pub mod limit;
pub mod policy;
pub mod tier;

pub use auth::{AuthResponse, LoginRequest, LogoutRequest, RefreshRequest, RefreshResponse, SignupRequest};
pub use claims::UserClaims;
pub use limit::{FeatureLimit, QuotaLimit, UNLIMITED};
pub use policy::{AccessLevel, RoutePolicy};
pub use tier::Tier;
