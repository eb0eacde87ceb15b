//! # tenantgate-auth
//!
//! Authorization decisions and client session lifecycle for TenantGate.
//!
//! ## Modules
//!
//! - `claims` : normalization of loosely-typed claim payloads and token decoding
//! - `policy` : ordered route policy table and allow/deny evaluation
//! - `entitlement` : tier catalog, feature flags, and numeric quotas
//! - `session` : hydration, expiry watch, single-flight refresh, and auth retry

pub mod claims;
pub mod entitlement;
pub mod policy;
pub mod session;

pub use claims::{RoleEncoding, decode_token_payload, normalize_claims, normalize_roles};
pub use entitlement::{EntitlementEngine, EntitlementResult, FeatureCheck, TierCatalog};
pub use policy::{AccessDecision, DenyReason, PolicyTable, RoutePolicyResolver};
pub use session::{Session, SessionEvent, SessionManager, SessionState, SignOutReason};
