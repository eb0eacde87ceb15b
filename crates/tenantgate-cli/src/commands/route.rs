//! Route evaluation command.

use std::collections::BTreeMap;

use clap::Args;
use serde::Serialize;

use crate::output::{self, OutputFormat};
use tenantgate_auth::policy::RoutePolicyResolver;
use tenantgate_core::config::AppConfig;
use tenantgate_core::error::AppError;

/// Arguments for the route command
#[derive(Debug, Args)]
pub struct RouteArgs {
    /// Path to evaluate, e.g. `/admin/users/42`
    pub path: String,

    /// Role held by the caller (repeatable)
    #[arg(long = "role")]
    pub roles: Vec<String>,

    /// Permission held by the caller (repeatable)
    #[arg(long = "permission")]
    pub permissions: Vec<String>,

    /// Evaluate as a signed-out caller
    #[arg(long, conflicts_with_all = ["roles", "permissions"])]
    pub signed_out: bool,
}

/// Route decision display
#[derive(Debug, Serialize)]
struct RouteReport<'a> {
    path: &'a str,
    allowed: bool,
    matched: Option<String>,
    reason: Option<String>,
    redirect: Option<String>,
    params: BTreeMap<String, String>,
}

/// Execute the route command
pub fn execute(args: &RouteArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let resolver = RoutePolicyResolver::from_config(&config.routes, &config.session)?;

    let decision = if args.signed_out {
        resolver.evaluate_claims(&args.path, None)
    } else {
        resolver.evaluate(&args.path, &args.roles, &args.permissions)
    };

    let report = RouteReport {
        path: &args.path,
        allowed: decision.allowed,
        matched: decision.matched.clone(),
        reason: decision.reason.as_ref().map(ToString::to_string),
        redirect: resolver.fallback_for(&decision).map(str::to_string),
        params: resolver.match_params(&args.path).unwrap_or_default(),
    };

    output::print_item(&report, format);
    Ok(())
}
