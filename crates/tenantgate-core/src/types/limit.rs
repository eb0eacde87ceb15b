//! Feature flag and quota limit types.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Sentinel integer meaning "no limit" in tier catalogs.
pub const UNLIMITED: i64 = -1;

/// A numeric quota.
///
/// Serialized as a plain integer where `-1` means unlimited. Any other
/// negative value is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum QuotaLimit {
    /// A fixed maximum count.
    Fixed(u64),
    /// No maximum.
    Unlimited,
}

impl QuotaLimit {
    /// Whether `current_count` items leave room for one more.
    pub fn admits(&self, current_count: u64) -> bool {
        match self {
            Self::Fixed(max) => current_count < *max,
            Self::Unlimited => true,
        }
    }

    /// Return the numeric limit, or `None` for unlimited.
    pub fn as_max(&self) -> Option<u64> {
        match self {
            Self::Fixed(max) => Some(*max),
            Self::Unlimited => None,
        }
    }
}

impl TryFrom<i64> for QuotaLimit {
    type Error = AppError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            UNLIMITED => Ok(Self::Unlimited),
            v if v >= 0 => Ok(Self::Fixed(v as u64)),
            v => Err(AppError::validation(format!(
                "Invalid quota {v}: only -1 (unlimited) may be negative"
            ))),
        }
    }
}

impl From<QuotaLimit> for i64 {
    fn from(limit: QuotaLimit) -> Self {
        match limit {
            QuotaLimit::Fixed(max) => i64::try_from(max).unwrap_or(i64::MAX),
            QuotaLimit::Unlimited => UNLIMITED,
        }
    }
}

/// A single entry of a tier's limit map: a boolean flag or a numeric quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureLimit {
    /// On/off feature.
    Flag(bool),
    /// Counted resource.
    Quota(QuotaLimit),
}

impl FeatureLimit {
    /// Whether the feature is usable at all.
    ///
    /// Quotas count as enabled when unlimited or positive.
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Flag(enabled) => *enabled,
            Self::Quota(QuotaLimit::Unlimited) => true,
            Self::Quota(QuotaLimit::Fixed(max)) => *max > 0,
        }
    }

    /// Return the quota, if this entry is numeric.
    pub fn as_quota(&self) -> Option<QuotaLimit> {
        match self {
            Self::Quota(quota) => Some(*quota),
            Self::Flag(_) => None,
        }
    }
}

impl From<bool> for FeatureLimit {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<QuotaLimit> for FeatureLimit {
    fn from(value: QuotaLimit) -> Self {
        Self::Quota(value)
    }
}
