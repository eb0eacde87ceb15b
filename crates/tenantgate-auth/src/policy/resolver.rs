//! Allow/deny evaluation of a requested path against the policy table.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::Serialize;
use tracing::debug;

use tenantgate_core::config::{RoutesConfig, SessionConfig};
use tenantgate_core::result::AppResult;
use tenantgate_core::types::{AccessLevel, RoutePolicy, UserClaims};

use super::defaults::default_policies;
use super::table::PolicyTable;

/// Why a route was denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum DenyReason {
    /// No table entry matches the path.
    RouteNotConfigured,
    /// The route is not public and the caller is signed out.
    AuthenticationRequired,
    /// The caller holds none of the required roles.
    RoleDenied {
        /// Roles, any one of which would have sufficed.
        required: Vec<String>,
    },
    /// The caller lacks some required permissions.
    PermissionDenied {
        /// Required permissions the caller does not hold.
        missing: Vec<String>,
    },
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RouteNotConfigured => write!(f, "route not found"),
            Self::AuthenticationRequired => write!(f, "authentication required"),
            Self::RoleDenied { required } => {
                write!(f, "requires one of roles: {}", required.join(", "))
            }
            Self::PermissionDenied { missing } => {
                write!(f, "missing permissions: {}", missing.join(", "))
            }
        }
    }
}

/// Outcome of evaluating a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    /// Whether the caller may reach the route.
    pub allowed: bool,
    /// Pattern of the entry that decided, if any.
    pub matched: Option<String>,
    /// Why the route was denied.
    pub reason: Option<DenyReason>,
}

impl AccessDecision {
    fn allow(policy: &RoutePolicy) -> Self {
        Self {
            allowed: true,
            matched: Some(policy.path.clone()),
            reason: None,
        }
    }

    fn deny(policy: Option<&RoutePolicy>, reason: DenyReason) -> Self {
        Self {
            allowed: false,
            matched: policy.map(|p| p.path.clone()),
            reason: Some(reason),
        }
    }
}

/// Evaluates paths against an ordered [`PolicyTable`].
///
/// Evaluation is a pure function of the path and the caller's roles and
/// permissions.
#[derive(Debug, Clone)]
pub struct RoutePolicyResolver {
    /// The policy table.
    table: PolicyTable,
    /// Destination for signed-out callers.
    signed_out_redirect: String,
    /// Destination for signed-in callers who were denied.
    denied_fallback: String,
}

impl RoutePolicyResolver {
    /// Create a resolver over `table`.
    pub fn new(
        table: PolicyTable,
        signed_out_redirect: impl Into<String>,
        denied_fallback: impl Into<String>,
    ) -> Self {
        Self {
            table,
            signed_out_redirect: signed_out_redirect.into(),
            denied_fallback: denied_fallback.into(),
        }
    }

    /// Create a resolver over the built-in table.
    pub fn with_defaults() -> AppResult<Self> {
        let routes = RoutesConfig::default();
        let session = SessionConfig::default();
        Self::from_config(&routes, &session)
    }

    /// Create a resolver from configuration, falling back to the built-in
    /// table when no policies are configured.
    pub fn from_config(routes: &RoutesConfig, session: &SessionConfig) -> AppResult<Self> {
        let policies = routes.policies.clone().unwrap_or_else(default_policies);
        Ok(Self::new(
            PolicyTable::new(policies)?,
            &session.signed_out_redirect,
            &routes.denied_fallback,
        ))
    }

    /// The underlying table.
    pub fn table(&self) -> &PolicyTable {
        &self.table
    }

    /// The first entry matching `path`.
    pub fn find_policy(&self, path: &str) -> Option<&RoutePolicy> {
        self.table.find_policy(path)
    }

    /// Named segment values of the entry matching `path`.
    pub fn match_params(&self, path: &str) -> Option<BTreeMap<String, String>> {
        self.table.find_match(path).map(|m| m.params)
    }

    /// Decide whether a caller holding `roles` and `permissions` may reach
    /// `path`.
    pub fn evaluate<R, P>(&self, path: &str, roles: R, permissions: P) -> AccessDecision
    where
        R: IntoIterator,
        R::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let Some(policy) = self.table.find_policy(path) else {
            debug!(path, "No route policy matched");
            return AccessDecision::deny(None, DenyReason::RouteNotConfigured);
        };

        let roles: HashSet<String> = roles.into_iter().map(|r| r.as_ref().to_string()).collect();
        let permissions: HashSet<String> = permissions
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect();

        let decision = decide(policy, &roles, &permissions);
        debug!(
            path,
            policy = %policy.path,
            allowed = decision.allowed,
            "Route evaluated"
        );
        decision
    }

    /// Decide for a possibly signed-out caller.
    ///
    /// Signed-out callers only reach public routes.
    pub fn evaluate_claims(&self, path: &str, claims: Option<&UserClaims>) -> AccessDecision {
        match claims {
            Some(claims) => self.evaluate(path, &claims.roles, &claims.permissions),
            None => match self.table.find_policy(path) {
                None => AccessDecision::deny(None, DenyReason::RouteNotConfigured),
                Some(policy) if policy.allowed_for == AccessLevel::Public => {
                    AccessDecision::allow(policy)
                }
                Some(policy) => {
                    AccessDecision::deny(Some(policy), DenyReason::AuthenticationRequired)
                }
            },
        }
    }

    /// Where to send the caller after `decision`, or `None` if allowed.
    pub fn fallback_for(&self, decision: &AccessDecision) -> Option<&str> {
        match &decision.reason {
            None => None,
            Some(DenyReason::AuthenticationRequired) => Some(self.signed_out_redirect.as_str()),
            Some(_) => Some(self.denied_fallback.as_str()),
        }
    }
}

fn decide(
    policy: &RoutePolicy,
    roles: &HashSet<String>,
    permissions: &HashSet<String>,
) -> AccessDecision {
    match policy.allowed_for {
        AccessLevel::Public => AccessDecision::allow(policy),
        AccessLevel::Authenticated => match missing_permissions(policy, permissions) {
            Some(missing) => {
                AccessDecision::deny(Some(policy), DenyReason::PermissionDenied { missing })
            }
            None => AccessDecision::allow(policy),
        },
        AccessLevel::Admin | AccessLevel::CompanyOwner => {
            if let Some(required) = declared(&policy.required_roles) {
                if !required.iter().any(|r| roles.contains(r)) {
                    return AccessDecision::deny(
                        Some(policy),
                        DenyReason::RoleDenied {
                            required: required.to_vec(),
                        },
                    );
                }
            }
            match missing_permissions(policy, permissions) {
                Some(missing) => {
                    AccessDecision::deny(Some(policy), DenyReason::PermissionDenied { missing })
                }
                None => AccessDecision::allow(policy),
            }
        }
    }
}

/// A requirement list counts as declared only when it is non-empty.
fn declared(list: &Option<Vec<String>>) -> Option<&[String]> {
    list.as_deref().filter(|l| !l.is_empty())
}

fn missing_permissions(policy: &RoutePolicy, held: &HashSet<String>) -> Option<Vec<String>> {
    let required = declared(&policy.required_permissions)?;
    let missing: Vec<String> = required
        .iter()
        .filter(|p| !held.contains(*p))
        .cloned()
        .collect();
    if missing.is_empty() {
        None
    } else {
        Some(missing)
    }
}
