//! Tier → feature limit catalog.

use std::collections::BTreeMap;

use tracing::debug;

use tenantgate_core::config::EntitlementsConfig;
use tenantgate_core::error::AppError;
use tenantgate_core::result::AppResult;
use tenantgate_core::types::{FeatureLimit, QuotaLimit, Tier};

/// Feature key → flag or quota for one tier.
pub type TierLimits = BTreeMap<String, FeatureLimit>;

static EMPTY_LIMITS: TierLimits = BTreeMap::new();

/// The full limit map of every tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierCatalog {
    tiers: BTreeMap<Tier, TierLimits>,
}

impl TierCatalog {
    /// Build a catalog from explicit maps. Tiers left out have no features.
    pub fn new(tiers: BTreeMap<Tier, TierLimits>) -> Self {
        Self { tiers }
    }

    /// The built-in catalog.
    pub fn builtin() -> Self {
        let mut tiers = BTreeMap::new();

        // Free: the basics, tight quotas
        tiers.insert(
            Tier::Free,
            limits(
                &[
                    ("linkScheduling", false),
                    ("analytics", false),
                    ("customThemes", false),
                    ("removeBranding", false),
                    ("customDomains", false),
                    ("prioritySupport", false),
                    ("apiAccess", false),
                    ("sso", false),
                ],
                &[
                    ("maxLinks", 10),
                    ("maxLinkGroups", 1),
                    ("maxPages", 1),
                    ("maxTeamMembers", 1),
                ],
            ),
        );

        // Pro: scheduling, analytics, themes
        tiers.insert(
            Tier::Pro,
            limits(
                &[
                    ("linkScheduling", true),
                    ("analytics", true),
                    ("customThemes", true),
                    ("removeBranding", false),
                    ("customDomains", false),
                    ("prioritySupport", false),
                    ("apiAccess", false),
                    ("sso", false),
                ],
                &[
                    ("maxLinks", 100),
                    ("maxLinkGroups", 5),
                    ("maxPages", 3),
                    ("maxTeamMembers", 3),
                ],
            ),
        );

        // Premium: pro + branding, domains, support, unlimited links
        tiers.insert(
            Tier::Premium,
            limits(
                &[
                    ("linkScheduling", true),
                    ("analytics", true),
                    ("customThemes", true),
                    ("removeBranding", true),
                    ("customDomains", true),
                    ("prioritySupport", true),
                    ("apiAccess", false),
                    ("sso", false),
                ],
                &[
                    ("maxLinks", -1),
                    ("maxLinkGroups", 10),
                    ("maxPages", 10),
                    ("maxTeamMembers", 10),
                ],
            ),
        );

        // Enterprise: everything
        tiers.insert(
            Tier::Enterprise,
            limits(
                &[
                    ("linkScheduling", true),
                    ("analytics", true),
                    ("customThemes", true),
                    ("removeBranding", true),
                    ("customDomains", true),
                    ("prioritySupport", true),
                    ("apiAccess", true),
                    ("sso", true),
                ],
                &[
                    ("maxLinks", -1),
                    ("maxLinkGroups", -1),
                    ("maxPages", -1),
                    ("maxTeamMembers", -1),
                ],
            ),
        );

        Self { tiers }
    }

    /// Merge configured overrides over the built-in catalog.
    ///
    /// Override keys that differ from a built-in key only by ASCII case
    /// replace the built-in entry, so case-folding config loaders cannot
    /// split a feature in two.
    pub fn with_overrides(config: &EntitlementsConfig) -> AppResult<Self> {
        let mut catalog = Self::builtin();

        for (tier_name, features) in &config.tiers {
            let tier: Tier = tier_name.parse().map_err(|e: AppError| {
                AppError::configuration(format!("Unknown tier in entitlements: {}", e.message))
            })?;
            let entry = catalog.tiers.entry(tier).or_default();

            for (key, limit) in features {
                let canonical = entry
                    .keys()
                    .find(|existing| existing.eq_ignore_ascii_case(key))
                    .cloned()
                    .unwrap_or_else(|| key.clone());
                debug!(%tier, feature = %canonical, ?limit, "Applying entitlement override");
                entry.insert(canonical, *limit);
            }
        }

        Ok(catalog)
    }

    /// Full limit map of `tier`.
    pub fn limits_for(&self, tier: Tier) -> &TierLimits {
        self.tiers.get(&tier).unwrap_or(&EMPTY_LIMITS)
    }

    /// A single entry of `tier`'s map.
    pub fn limit(&self, tier: Tier, key: &str) -> Option<FeatureLimit> {
        self.limits_for(tier).get(key).copied()
    }

    /// Every feature key known to any tier.
    pub fn feature_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .tiers
            .values()
            .flat_map(|limits| limits.keys().map(String::as_str))
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }
}

impl Default for TierCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn limits(flags: &[(&str, bool)], quotas: &[(&str, i64)]) -> TierLimits {
    let mut map = TierLimits::new();
    for (key, enabled) in flags {
        map.insert(key.to_string(), FeatureLimit::Flag(*enabled));
    }
    for (key, value) in quotas {
        let quota = if *value < 0 {
            QuotaLimit::Unlimited
        } else {
            QuotaLimit::Fixed(*value as u64)
        };
        map.insert(key.to_string(), FeatureLimit::Quota(quota));
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_every_tier() {
        let catalog = TierCatalog::builtin();
        for tier in Tier::ALL {
            assert!(!catalog.limits_for(tier).is_empty(), "{tier}");
        }
        assert_eq!(
            catalog.limit(Tier::Premium, "maxLinkGroups"),
            Some(FeatureLimit::Quota(QuotaLimit::Fixed(10)))
        );
    }

    #[test]
    fn test_overrides_merge_case_insensitively() {
        let mut features = BTreeMap::new();
        features.insert("maxlinkgroups".to_string(), FeatureLimit::Quota(QuotaLimit::Fixed(2)));
        features.insert("betaEditor".to_string(), FeatureLimit::Flag(true));
        let mut config = EntitlementsConfig::default();
        config.tiers.insert("free".to_string(), features);

        let catalog = TierCatalog::with_overrides(&config).unwrap();
        assert_eq!(
            catalog.limit(Tier::Free, "maxLinkGroups"),
            Some(FeatureLimit::Quota(QuotaLimit::Fixed(2)))
        );
        assert!(catalog.limit(Tier::Free, "maxlinkgroups").is_none());
        assert_eq!(catalog.limit(Tier::Free, "betaEditor"), Some(FeatureLimit::Flag(true)));
    }

    #[test]
    fn test_unknown_tier_override_is_rejected() {
        let mut config = EntitlementsConfig::default();
        config.tiers.insert("gold".to_string(), BTreeMap::new());
        assert!(TierCatalog::with_overrides(&config).is_err());
    }

    #[test]
    fn test_feature_keys_are_unique() {
        let catalog = TierCatalog::builtin();
        let keys = catalog.feature_keys();
        assert!(keys.contains(&"linkScheduling"));
        let mut deduped = keys.clone();
        deduped.dedup();
        assert_eq!(keys, deduped);
    }
}
