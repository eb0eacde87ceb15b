//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Every section has defaults, so an empty or missing
//! file yields a working configuration.

pub mod api;
pub mod entitlements;
pub mod logging;
pub mod routes;
pub mod session;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use self::api::ApiConfig;
pub use self::entitlements::EntitlementsConfig;
pub use self::logging::LoggingConfig;
pub use self::routes::RoutesConfig;
pub use self::session::{SessionConfig, StoreBackend};

use crate::error::AppError;

/// Prefix of environment variables that override file settings.
const ENV_PREFIX: &str = "TENANTGATE";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Session lifecycle settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Auth endpoint settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Route policy settings.
    #[serde(default)]
    pub routes: RoutesConfig,
    /// Tier catalog overrides.
    #[serde(default)]
    pub entitlements: EntitlementsConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for an environment.
    ///
    /// Merges `config/default`, the `config/{env}` overlay and environment
    /// variables prefixed with `TENANTGATE__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::build(&["config/default", &format!("config/{env}")])
    }

    /// Load configuration from a single file plus environment variables.
    pub fn load_file(path: &str) -> Result<Self, AppError> {
        Self::build(&[path])
    }

    fn build(files: &[&str]) -> Result<Self, AppError> {
        let mut builder = config::Config::builder();
        for file in files {
            debug!(file, "Adding configuration source");
            builder = builder.add_source(config::File::with_name(file).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
