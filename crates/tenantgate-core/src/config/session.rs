//! Session lifecycle configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Session lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How long before expiry an access token counts as "expiring soon".
    #[serde(default = "default_lookahead")]
    pub refresh_lookahead_seconds: u64,
    /// Interval of the background expiry watch.
    #[serde(default = "default_check_interval")]
    pub expiry_check_interval_seconds: u64,
    /// Where a signed-out caller is sent.
    #[serde(default = "default_signed_out_redirect")]
    pub signed_out_redirect: String,
    /// Persisted store backend.
    #[serde(default)]
    pub store: StoreBackend,
    /// Path of the JSON session file (file backend only).
    #[serde(default = "default_store_path")]
    pub store_path: String,
    /// Prefix applied to every persisted key.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl SessionConfig {
    /// Lookahead window as a `chrono` duration.
    pub fn refresh_lookahead(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.refresh_lookahead_seconds as i64)
    }

    /// Expiry watch interval as a `std` duration.
    pub fn expiry_check_interval(&self) -> Duration {
        Duration::from_secs(self.expiry_check_interval_seconds.max(1))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_lookahead_seconds: default_lookahead(),
            expiry_check_interval_seconds: default_check_interval(),
            signed_out_redirect: default_signed_out_redirect(),
            store: StoreBackend::default(),
            store_path: default_store_path(),
            key_prefix: default_key_prefix(),
        }
    }
}

/// Backend used to persist the session between runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// JSON file on disk.
    #[default]
    File,
    /// Process memory only.
    Memory,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::File => write!(f, "file"),
            StoreBackend::Memory => write!(f, "memory"),
        }
    }
}

fn default_lookahead() -> u64 {
    300
}

fn default_check_interval() -> u64 {
    60
}

fn default_signed_out_redirect() -> String {
    "/login".to_string()
}

fn default_store_path() -> String {
    "data/session.json".to_string()
}

fn default_key_prefix() -> String {
    "tenantgate".to_string()
}
