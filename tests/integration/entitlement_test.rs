//! Integration tests for tier entitlements.

use std::collections::BTreeMap;

use tenantgate::EntitlementEngine;
use tenantgate::tenantgate_auth::entitlement::FeatureCheck;
use tenantgate::tenantgate_core::config::{AppConfig, EntitlementsConfig};
use tenantgate::tenantgate_core::types::{FeatureLimit, QuotaLimit, Tier};

fn engine() -> EntitlementEngine {
    EntitlementEngine::from_config(&AppConfig::default().entitlements).unwrap()
}

#[test]
fn test_free_tier_link_scheduling_requires_pro() {
    let result = engine().can_access_feature(Tier::Free, "linkScheduling");

    assert!(!result.allowed);
    assert_eq!(result.current_tier, Tier::Free);
    assert_eq!(result.required_tier, Some(Tier::Pro));
}

#[test]
fn test_premium_link_group_quota() {
    let engine = engine();

    assert!(engine.has_reached_limit(Tier::Premium, "maxLinkGroups", 9).allowed);

    let denied = engine.has_reached_limit(Tier::Premium, "maxLinkGroups", 10);
    assert!(!denied.allowed);
    assert!(denied.reason.unwrap().contains("10"));
    assert_eq!(denied.required_tier, Some(Tier::Enterprise));
}

#[test]
fn test_unlimited_quota_admits_any_count() {
    let engine = engine();
    for count in [0, 1, 10_000, u64::MAX] {
        assert!(engine.has_reached_limit(Tier::Enterprise, "maxLinks", count).allowed);
    }
}

#[test]
fn test_compare_tiers_total_order() {
    for a in Tier::ALL {
        assert!(EntitlementEngine::compare_tiers(a, a));
        for b in Tier::ALL {
            assert_eq!(
                EntitlementEngine::compare_tiers(a, b),
                EntitlementEngine::tier_rank(a) >= EntitlementEngine::tier_rank(b)
            );
        }
    }
}

#[test]
fn test_validation_reports_first_failing_feature_only() {
    let checks = [
        FeatureCheck::new("analytics", false),
        FeatureCheck::new("customDomains", true),
        FeatureCheck::new("sso", true),
    ];

    let result = engine().validate_features(Tier::Pro, &checks);

    assert!(!result.allowed);
    assert_eq!(result.required_tier, Some(Tier::Premium));
    assert!(result.reason.unwrap().contains("customDomains"));
}

#[test]
fn test_configured_override_changes_minimum_tier() {
    let mut free = BTreeMap::new();
    free.insert("analytics".to_string(), FeatureLimit::Flag(true));
    free.insert(
        "maxLinks".to_string(),
        FeatureLimit::Quota(QuotaLimit::Fixed(25)),
    );
    let mut tiers = BTreeMap::new();
    tiers.insert("free".to_string(), free);

    let engine = EntitlementEngine::from_config(&EntitlementsConfig { tiers }).unwrap();

    assert!(engine.can_access_feature(Tier::Free, "analytics").allowed);
    assert!(engine.has_reached_limit(Tier::Free, "maxLinks", 24).allowed);
    assert!(!engine.has_reached_limit(Tier::Free, "maxLinks", 25).allowed);
}

#[test]
fn test_unknown_tier_name_falls_back_to_free() {
    let engine = engine();
    assert_eq!(engine.limits_for("platinum"), engine.limits_for("free"));
}
