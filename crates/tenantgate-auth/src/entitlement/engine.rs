//! Entitlement decisions over the tier catalog.
//!
//! Every check returns an [`EntitlementResult`]; nothing here fails. A
//! denial names the lowest tier that would have allowed the action so the
//! caller can offer an upgrade.

use serde::{Deserialize, Serialize};
use tracing::debug;

use tenantgate_core::config::EntitlementsConfig;
use tenantgate_core::result::AppResult;
use tenantgate_core::types::{FeatureLimit, Tier};

use super::catalog::{TierCatalog, TierLimits};

/// Outcome of an entitlement check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementResult {
    /// Whether the action is permitted.
    pub allowed: bool,
    /// Tier the check was made for.
    pub current_tier: Tier,
    /// Lowest tier that would permit the action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_tier: Option<Tier>,
    /// Human-readable denial reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl EntitlementResult {
    fn allowed(tier: Tier) -> Self {
        Self {
            allowed: true,
            current_tier: tier,
            required_tier: None,
            reason: None,
        }
    }

    fn denied(tier: Tier, required_tier: Option<Tier>, reason: String) -> Self {
        Self {
            allowed: false,
            current_tier: tier,
            required_tier,
            reason: Some(reason),
        }
    }
}

/// One entry of a multi-feature validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureCheck {
    /// Feature key.
    pub feature: String,
    /// Whether the feature is being used by the thing under validation.
    pub is_in_use: bool,
}

impl FeatureCheck {
    /// Create a check.
    pub fn new(feature: impl Into<String>, is_in_use: bool) -> Self {
        Self {
            feature: feature.into(),
            is_in_use,
        }
    }
}

/// Evaluates tier entitlements.
#[derive(Debug, Clone, Default)]
pub struct EntitlementEngine {
    /// Tier → limit map.
    catalog: TierCatalog,
}

impl EntitlementEngine {
    /// Create an engine over `catalog`.
    pub fn new(catalog: TierCatalog) -> Self {
        Self { catalog }
    }

    /// Create an engine over the built-in catalog plus configured overrides.
    pub fn from_config(config: &EntitlementsConfig) -> AppResult<Self> {
        Ok(Self::new(TierCatalog::with_overrides(config)?))
    }

    /// The underlying catalog.
    pub fn catalog(&self) -> &TierCatalog {
        &self.catalog
    }

    /// Fixed ordinal: free < pro < premium < enterprise.
    pub fn tier_rank(tier: Tier) -> u8 {
        tier.rank()
    }

    /// True iff `a` is at least as entitled as `b`.
    pub fn compare_tiers(a: Tier, b: Tier) -> bool {
        Self::tier_rank(a) >= Self::tier_rank(b)
    }

    /// Full limit map for a tier name; unknown names fall back to `free`.
    pub fn limits_for(&self, tier: &str) -> &TierLimits {
        self.catalog.limits_for(Tier::parse_lenient(tier))
    }

    /// Lowest tier with `feature` enabled, or the highest tier if none has it.
    pub fn minimum_tier_for(&self, feature: &str) -> Tier {
        Tier::ALL
            .into_iter()
            .find(|tier| self.is_enabled(*tier, feature))
            .unwrap_or_else(Tier::highest)
    }

    /// Check whether `tier` includes `feature`.
    pub fn can_access_feature(&self, tier: Tier, feature: &str) -> EntitlementResult {
        if self.is_enabled(tier, feature) {
            return EntitlementResult::allowed(tier);
        }

        let required = self.minimum_tier_for(feature);
        debug!(%tier, feature, %required, "Feature not included in tier");
        EntitlementResult::denied(
            tier,
            Some(required),
            format!("{feature} requires the {required} plan or higher"),
        )
    }

    /// Check whether one more item fits under `tier`'s `key` quota when
    /// `current_count` items already exist.
    pub fn has_reached_limit(&self, tier: Tier, key: &str, current_count: u64) -> EntitlementResult {
        match self.catalog.limit(tier, key) {
            None => EntitlementResult::denied(
                tier,
                None,
                format!("limit {key} is not configured for the {tier} plan"),
            ),
            Some(FeatureLimit::Flag(_)) => self.can_access_feature(tier, key),
            Some(FeatureLimit::Quota(quota)) if quota.admits(current_count) => {
                EntitlementResult::allowed(tier)
            }
            Some(FeatureLimit::Quota(quota)) => {
                let max = quota.as_max().unwrap_or_default();
                let required = Tier::ALL
                    .into_iter()
                    .filter(|candidate| candidate.rank() > tier.rank())
                    .find(|candidate| {
                        self.catalog
                            .limit(*candidate, key)
                            .and_then(|l| l.as_quota())
                            .is_some_and(|q| q.admits(current_count))
                    });
                debug!(%tier, key, current_count, max, "Quota reached");
                EntitlementResult::denied(
                    tier,
                    required,
                    format!("You have reached the limit of {max} {key} on the {tier} plan"),
                )
            }
        }
    }

    /// Validate several features in order, stopping at the first in-use
    /// feature the tier does not include.
    ///
    /// Only that feature's required tier is reported; later failures in the
    /// same pass are not evaluated.
    pub fn validate_features(&self, tier: Tier, checks: &[FeatureCheck]) -> EntitlementResult {
        checks
            .iter()
            .filter(|check| check.is_in_use)
            .map(|check| self.can_access_feature(tier, &check.feature))
            .find(|result| !result.allowed)
            .unwrap_or_else(|| EntitlementResult::allowed(tier))
    }

    fn is_enabled(&self, tier: Tier, feature: &str) -> bool {
        self.catalog
            .limit(tier, feature)
            .is_some_and(|limit| limit.is_enabled())
    }
}
