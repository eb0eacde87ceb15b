//! # TenantGate
//!
//! Auth and session core for a multi-tenant SaaS client.
//!
//! - [`tenantgate_core`]: shared types, collaborator traits, configuration, errors
//! - [`tenantgate_store`]: persisted session stores
//! - [`tenantgate_auth`]: claims normalization, route policies, entitlements,
//!   and the session lifecycle
//! - [`tenantgate_client`]: HTTP auth endpoints and the authenticated API client

pub use tenantgate_auth;
pub use tenantgate_client;
pub use tenantgate_core;
pub use tenantgate_store;

pub use tenantgate_auth::{
    AccessDecision, DenyReason, EntitlementEngine, EntitlementResult, RoutePolicyResolver,
    Session, SessionEvent, SessionManager, SessionState, SignOutReason,
};
pub use tenantgate_core::{AppError, AppResult};
