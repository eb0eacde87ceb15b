//! Integration tests for route policy evaluation.

mod helpers;

use tenantgate::tenantgate_auth::claims::{claims_from_token, normalize_claims};
use tenantgate::tenantgate_auth::policy::DEFAULT_USER_PERMISSIONS;
use tenantgate::tenantgate_core::config::{AppConfig, RoutesConfig, SessionConfig};
use tenantgate::tenantgate_core::types::{AccessLevel, RoutePolicy};
use tenantgate::{DenyReason, RoutePolicyResolver};

#[test]
fn test_regular_user_denied_admin_users() {
    let resolver = RoutePolicyResolver::with_defaults().unwrap();

    let decision = resolver.evaluate("/admin/users", ["user"], DEFAULT_USER_PERMISSIONS);

    assert!(!decision.allowed);
    assert!(matches!(decision.reason, Some(DenyReason::RoleDenied { .. })));
    assert_eq!(resolver.fallback_for(&decision), Some("/dashboard"));
}

#[test]
fn test_admin_with_write_permission_edits_user() {
    let resolver = RoutePolicyResolver::with_defaults().unwrap();

    let decision = resolver.evaluate("/admin/users/42/edit", ["admin"], ["write:users"]);

    assert!(decision.allowed);
    assert_eq!(decision.matched.as_deref(), Some("/admin/users/:id/edit"));
    assert_eq!(
        resolver.match_params("/admin/users/42/edit").unwrap()["id"],
        "42"
    );
}

#[test]
fn test_claims_from_login_payload_drive_decision() {
    let resolver = RoutePolicyResolver::with_defaults().unwrap();
    let claims = normalize_claims(&helpers::user()).unwrap();

    assert!(resolver.evaluate_claims("/admin/users/new", Some(&claims)).allowed);
    assert!(!resolver.evaluate_claims("/admin/users", Some(&claims)).allowed);

    let signed_out = resolver.evaluate_claims("/dashboard", None);
    assert_eq!(signed_out.reason, Some(DenyReason::AuthenticationRequired));
    assert_eq!(resolver.fallback_for(&signed_out), Some("/login"));
}

#[test]
fn test_token_claims_with_quoted_roles() {
    let resolver = RoutePolicyResolver::with_defaults().unwrap();
    let token = helpers::token_with(
        serde_json::json!({
            "id": "owner-9",
            "role": "[\"company_owner\"]",
            "permissions": ["manage:company"],
            "company_id": "acme"
        }),
        600,
    );
    let claims = claims_from_token(&token).unwrap();

    assert_eq!(claims.company_id.as_deref(), Some("acme"));
    assert!(
        resolver
            .evaluate_claims("/company/acme/members", Some(&claims))
            .allowed
    );
}

#[test]
fn test_configured_table_order_is_authoritative() {
    let routes = RoutesConfig {
        denied_fallback: "/home".to_string(),
        policies: Some(vec![
            RoutePolicy::new("/reports/:id", AccessLevel::Authenticated)
                .with_permissions(&["read:reports"]),
            RoutePolicy::public("/reports/public"),
        ]),
    };
    let resolver = RoutePolicyResolver::from_config(&routes, &SessionConfig::default()).unwrap();

    let decision = resolver.evaluate("/reports/public", Vec::<String>::new(), Vec::<String>::new());

    assert!(!decision.allowed);
    assert_eq!(decision.matched.as_deref(), Some("/reports/:id"));
    assert_eq!(resolver.fallback_for(&decision), Some("/home"));
}

#[test]
fn test_unknown_route_denied_by_default() {
    let resolver = RoutePolicyResolver::from_config(
        &AppConfig::default().routes,
        &AppConfig::default().session,
    )
    .unwrap();

    let decision = resolver.evaluate("/nowhere", ["admin"], ["write:users"]);
    assert_eq!(decision.reason, Some(DenyReason::RouteNotConfigured));
    assert_eq!(decision.reason.unwrap().to_string(), "route not found");
}
