//! Route policy table entries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Audience a route is open to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// Anyone, signed in or not.
    Public,
    /// Any signed-in user holding the declared permissions.
    Authenticated,
    /// Administrative routes.
    Admin,
    /// Routes reserved to the owner of a company account.
    CompanyOwner,
}

impl AccessLevel {
    /// Return the level as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Authenticated => "authenticated",
            Self::Admin => "admin",
            Self::CompanyOwner => "company_owner",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of the ordered route policy table.
///
/// `path` is made of literal segments and `:name` segments, each of which
/// matches exactly one path segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePolicy {
    /// Path pattern, e.g. `/admin/users/:id/edit`.
    pub path: String,
    /// Audience the route is open to.
    pub allowed_for: AccessLevel,
    /// The caller must hold at least one of these roles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_roles: Option<Vec<String>>,
    /// The caller must hold all of these permissions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_permissions: Option<Vec<String>>,
}

impl RoutePolicy {
    /// Create a public route.
    pub fn public(path: impl Into<String>) -> Self {
        Self::new(path, AccessLevel::Public)
    }

    /// Create an entry with no role or permission requirements.
    pub fn new(path: impl Into<String>, allowed_for: AccessLevel) -> Self {
        Self {
            path: path.into(),
            allowed_for,
            required_roles: None,
            required_permissions: None,
        }
    }

    /// Require at least one of `roles`.
    pub fn with_roles(mut self, roles: &[&str]) -> Self {
        self.required_roles = Some(roles.iter().map(|r| r.to_string()).collect());
        self
    }

    /// Require all of `permissions`.
    pub fn with_permissions(mut self, permissions: &[&str]) -> Self {
        self.required_permissions = Some(permissions.iter().map(|p| p.to_string()).collect());
        self
    }
}
