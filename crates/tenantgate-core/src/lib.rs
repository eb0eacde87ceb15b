//! # tenantgate-core
//!
//! Core crate for TenantGate. Contains the collaborator traits (session
//! store, auth API), configuration schemas, shared domain types
//! (claims, tiers, limits, route policies), and the unified error system.
//!
//! This crate has **no** internal dependencies on other TenantGate crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
