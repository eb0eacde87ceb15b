//! Canonical user claims carried by a session.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::tier::Tier;

/// Normalized identity, role and permission facts for the signed-in user.
///
/// Roles and permissions are always plain-string sets regardless of how the
/// upstream payload encoded them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserClaims {
    /// Stable user identifier.
    pub user_id: String,
    /// Display / login name.
    #[serde(default)]
    pub username: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
    /// Role names.
    #[serde(default)]
    pub roles: BTreeSet<String>,
    /// Permission names (e.g. `write:users`).
    #[serde(default)]
    pub permissions: BTreeSet<String>,
    /// Owning company, for company-scoped accounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    /// Subscription tier of the account.
    #[serde(default)]
    pub tier: Tier,
}

impl UserClaims {
    /// Check whether the user holds `role`.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Check whether the user holds at least one of `roles`.
    pub fn has_any_role<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        roles.iter().any(|r| self.roles.contains(r.as_ref()))
    }

    /// Check whether the user holds `permission`.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Check whether the user holds every one of `permissions`.
    pub fn has_all_permissions<S: AsRef<str>>(&self, permissions: &[S]) -> bool {
        permissions
            .iter()
            .all(|p| self.permissions.contains(p.as_ref()))
    }
}
