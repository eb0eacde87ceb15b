//! Route policy configuration.

use serde::{Deserialize, Serialize};

use crate::types::policy::RoutePolicy;

/// Route policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutesConfig {
    /// Where a signed-in caller is sent after a denied route.
    #[serde(default = "default_denied_fallback")]
    pub denied_fallback: String,
    /// Ordered policy table. Replaces the built-in table when present.
    #[serde(default)]
    pub policies: Option<Vec<RoutePolicy>>,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            denied_fallback: default_denied_fallback(),
            policies: None,
        }
    }
}

fn default_denied_fallback() -> String {
    "/dashboard".to_string()
}
