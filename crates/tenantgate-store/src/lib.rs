//! # tenantgate-store
//!
//! Persisted session store implementations for TenantGate. Supports two
//! backends:
//!
//! - **memory**: process-local map using [dashmap](https://crates.io/crates/dashmap)
//! - **file**: a JSON object on disk, re-read on every access so writes
//!   from other processes are visible
//!
//! The backend is selected at runtime based on configuration.

#[cfg(feature = "file")]
pub mod file;
pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;

pub use keys::SessionKeys;
pub use provider::StoreManager;
