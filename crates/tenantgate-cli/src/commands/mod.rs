//! CLI command definitions and dispatch.

pub mod entitlement;
pub mod route;
pub mod session;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use tenantgate_core::config::AppConfig;
use tenantgate_core::error::AppError;

/// TenantGate: route policies, tier entitlements, and session inspection
#[derive(Debug, Parser)]
#[command(name = "tenantgate", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Evaluate a path against the route policy table
    Route(route::RouteArgs),
    /// Check whether a tier has a feature
    Feature(entitlement::FeatureArgs),
    /// Check a quota against a current count
    Limit(entitlement::LimitArgs),
    /// Print the tier catalog
    Tiers,
    /// Persisted session management
    Session(session::SessionArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Route(args) => route::execute(args, config, self.format),
            Commands::Feature(args) => entitlement::feature(args, config, self.format),
            Commands::Limit(args) => entitlement::limit(args, config, self.format),
            Commands::Tiers => entitlement::tiers(config, self.format),
            Commands::Session(args) => session::execute(args, config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_file(config_path)
        .map_err(|e| AppError::configuration(format!("Failed to load config: {}", e.message)))
}
