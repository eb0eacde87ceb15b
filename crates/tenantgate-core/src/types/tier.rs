//! Subscription tier enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Subscription tiers, ordered by entitlement: Free < Pro < Premium < Enterprise.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Default tier for every account.
    #[default]
    Free,
    /// First paid tier.
    Pro,
    /// Second paid tier.
    Premium,
    /// Highest tier, negotiated per tenant.
    Enterprise,
}

impl Tier {
    /// Every tier in ascending rank order.
    pub const ALL: [Tier; 4] = [Tier::Free, Tier::Pro, Tier::Premium, Tier::Enterprise];

    /// Return the fixed ordinal of this tier (higher = more entitled).
    pub fn rank(&self) -> u8 {
        match self {
            Self::Free => 0,
            Self::Pro => 1,
            Self::Premium => 2,
            Self::Enterprise => 3,
        }
    }

    /// Check if this tier is at least as entitled as `other`.
    pub fn has_at_least(&self, other: &Tier) -> bool {
        self.rank() >= other.rank()
    }

    /// The highest tier.
    pub fn highest() -> Tier {
        Tier::Enterprise
    }

    /// Parse a tier, falling back to [`Tier::Free`] for unknown values.
    pub fn parse_lenient(value: &str) -> Tier {
        value.parse().unwrap_or_default()
    }

    /// Return the tier as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::Premium => "premium",
            Self::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tier {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            "premium" => Ok(Self::Premium),
            "enterprise" => Ok(Self::Enterprise),
            _ => Err(AppError::validation(format!(
                "Invalid tier: '{s}'. Expected one of: free, pro, premium, enterprise"
            ))),
        }
    }
}
