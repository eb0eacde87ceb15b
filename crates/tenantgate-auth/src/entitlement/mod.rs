//! Tier hierarchy, feature flags, and quota checks.

pub mod catalog;
pub mod engine;

pub use catalog::{TierCatalog, TierLimits};
pub use engine::{EntitlementEngine, EntitlementResult, FeatureCheck};
