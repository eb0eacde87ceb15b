//! Entitlement commands: feature flags, quotas, and the tier catalog.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use tenantgate_auth::entitlement::EntitlementEngine;
use tenantgate_core::config::AppConfig;
use tenantgate_core::error::AppError;
use tenantgate_core::types::{FeatureLimit, QuotaLimit, Tier};

/// Arguments for the feature command
#[derive(Debug, Args)]
pub struct FeatureArgs {
    /// Subscription tier (free, pro, premium, enterprise)
    #[arg(value_parser = parse_tier)]
    pub tier: Tier,
    /// Feature key, e.g. `analytics`
    pub feature: String,
}

/// Arguments for the limit command
#[derive(Debug, Args)]
pub struct LimitArgs {
    /// Subscription tier (free, pro, premium, enterprise)
    #[arg(value_parser = parse_tier)]
    pub tier: Tier,
    /// Quota key, e.g. `maxLinks`
    pub key: String,
    /// Number of items already in use
    pub count: u64,
}

/// Tier catalog display row
#[derive(Debug, Serialize, Tabled)]
struct TierRow {
    /// Feature key
    feature: String,
    /// Free tier
    free: String,
    /// Pro tier
    pro: String,
    /// Premium tier
    premium: String,
    /// Enterprise tier
    enterprise: String,
}

/// Execute the feature command
pub fn feature(args: &FeatureArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let engine = EntitlementEngine::from_config(&config.entitlements)?;
    let result = engine.can_access_feature(args.tier, &args.feature);
    output::print_item(&result, format);
    Ok(())
}

/// Execute the limit command
pub fn limit(args: &LimitArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let engine = EntitlementEngine::from_config(&config.entitlements)?;
    let result = engine.has_reached_limit(args.tier, &args.key, args.count);
    output::print_item(&result, format);
    Ok(())
}

/// Execute the tiers command
pub fn tiers(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let engine = EntitlementEngine::from_config(&config.entitlements)?;
    let catalog = engine.catalog();

    let cell = |tier: Tier, key: &str| describe(catalog.limit(tier, key));
    let rows: Vec<TierRow> = catalog
        .feature_keys()
        .into_iter()
        .map(|key| TierRow {
            feature: key.to_string(),
            free: cell(Tier::Free, key),
            pro: cell(Tier::Pro, key),
            premium: cell(Tier::Premium, key),
            enterprise: cell(Tier::Enterprise, key),
        })
        .collect();

    output::print_list(&rows, format);
    Ok(())
}

fn parse_tier(value: &str) -> Result<Tier, String> {
    value.parse::<Tier>().map_err(|e| e.message)
}

/// Render one catalog entry for display.
fn describe(limit: Option<FeatureLimit>) -> String {
    match limit {
        None => "-".to_string(),
        Some(FeatureLimit::Flag(true)) => "yes".to_string(),
        Some(FeatureLimit::Flag(false)) => "no".to_string(),
        Some(FeatureLimit::Quota(QuotaLimit::Unlimited)) => "unlimited".to_string(),
        Some(FeatureLimit::Quota(QuotaLimit::Fixed(max))) => max.to_string(),
    }
}
