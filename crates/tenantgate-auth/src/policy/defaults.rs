//! Built-in route policy table.

use tenantgate_core::types::{AccessLevel, RoutePolicy};

/// Permissions granted to every regular account.
pub const DEFAULT_USER_PERMISSIONS: &[&str] = &[
    "read:profile",
    "write:profile",
    "read:links",
    "write:links",
    "read:analytics",
];

/// The default, ordered policy table.
///
/// Specific paths come before the general ones they overlap with.
pub fn default_policies() -> Vec<RoutePolicy> {
    vec![
        // Public pages
        RoutePolicy::public("/"),
        RoutePolicy::public("/login"),
        RoutePolicy::public("/signup"),
        RoutePolicy::public("/pricing"),
        RoutePolicy::public("/forgot-password"),
        RoutePolicy::public("/u/:username"),
        // Signed-in workspace
        RoutePolicy::new("/dashboard", AccessLevel::Authenticated),
        RoutePolicy::new("/dashboard/links", AccessLevel::Authenticated)
            .with_permissions(&["read:links"]),
        RoutePolicy::new("/dashboard/links/:linkId", AccessLevel::Authenticated)
            .with_permissions(&["read:links", "write:links"]),
        RoutePolicy::new("/dashboard/analytics", AccessLevel::Authenticated)
            .with_permissions(&["read:analytics"]),
        RoutePolicy::new("/settings", AccessLevel::Authenticated),
        RoutePolicy::new("/settings/billing", AccessLevel::Authenticated)
            .with_permissions(&["manage:billing"]),
        // Administration
        RoutePolicy::new("/admin", AccessLevel::Admin).with_roles(&["admin"]),
        RoutePolicy::new("/admin/users", AccessLevel::Admin)
            .with_roles(&["admin"])
            .with_permissions(&["read:users"]),
        RoutePolicy::new("/admin/users/new", AccessLevel::Admin)
            .with_roles(&["admin"])
            .with_permissions(&["write:users"]),
        RoutePolicy::new("/admin/users/:id", AccessLevel::Admin)
            .with_roles(&["admin"])
            .with_permissions(&["read:users"]),
        RoutePolicy::new("/admin/users/:id/edit", AccessLevel::Admin)
            .with_roles(&["admin"])
            .with_permissions(&["write:users"]),
        RoutePolicy::new("/admin/companies", AccessLevel::Admin)
            .with_roles(&["admin"])
            .with_permissions(&["read:companies"]),
        // Company accounts
        RoutePolicy::new("/company/:companyId", AccessLevel::CompanyOwner)
            .with_roles(&["company_owner", "admin"]),
        RoutePolicy::new("/company/:companyId/members", AccessLevel::CompanyOwner)
            .with_roles(&["company_owner", "admin"])
            .with_permissions(&["manage:company"]),
        RoutePolicy::new("/company/:companyId/settings", AccessLevel::CompanyOwner)
            .with_roles(&["company_owner", "admin"])
            .with_permissions(&["manage:company"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyTable;

    #[test]
    fn test_default_table_compiles() {
        let table = PolicyTable::new(default_policies()).unwrap();
        assert_eq!(table.len(), default_policies().len());
    }

    #[test]
    fn test_new_user_page_precedes_wildcard() {
        let table = PolicyTable::new(default_policies()).unwrap();
        let policy = table.find_policy("/admin/users/new").unwrap();
        assert_eq!(policy.path, "/admin/users/new");
    }
}
