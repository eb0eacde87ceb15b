//! Tier catalog overrides.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::limit::FeatureLimit;

/// Per-tier overrides merged over the built-in tier catalog.
///
/// Outer keys are tier names, inner keys are feature keys. Integers use
/// `-1` for unlimited.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntitlementsConfig {
    /// Tier name → feature key → limit.
    #[serde(default)]
    pub tiers: BTreeMap<String, BTreeMap<String, FeatureLimit>>,
}
