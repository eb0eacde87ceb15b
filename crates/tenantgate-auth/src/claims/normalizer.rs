//! Canonicalization of role, permission, and user claim payloads.
//!
//! Upstream services are inconsistent about how they encode role lists:
//! a JSON array, a bare string, or a string holding one more level of JSON
//! (`"\"admin\""` or `"[\"admin\",\"user\"]"`). Everything funnels through
//! [`normalize_roles`], which never fails; anything unrecognized becomes an
//! empty set, the most restrictive result.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use tracing::debug;

use tenantgate_core::types::{Tier, UserClaims};

const USER_ID_FIELDS: [&str; 3] = ["userId", "id", "sub"];
const USERNAME_FIELDS: [&str; 2] = ["username", "name"];
const ROLE_FIELDS: [&str; 2] = ["roles", "role"];
const COMPANY_FIELDS: [&str; 2] = ["companyId", "company_id"];
const TIER_FIELDS: [&str; 2] = ["tier", "subscriptionTier"];

/// The known encodings of a role or permission list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleEncoding {
    /// A JSON array; non-string items are dropped.
    List(Vec<String>),
    /// A single bare name.
    Plain(String),
    /// A string carrying one more level of JSON encoding.
    Quoted(String),
    /// Anything else (numbers, objects, null).
    Unrecognized,
}

impl RoleEncoding {
    /// Classify a raw JSON value.
    pub fn classify(value: &Value) -> Self {
        match value {
            Value::Array(items) => Self::List(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect(),
            ),
            Value::String(raw) => {
                let trimmed = raw.trim();
                if trimmed.starts_with('"') || trimmed.starts_with('[') {
                    Self::Quoted(trimmed.to_string())
                } else {
                    Self::Plain(trimmed.to_string())
                }
            }
            _ => Self::Unrecognized,
        }
    }

    /// Resolve the encoding to a set of plain names.
    ///
    /// A quoted string is decoded exactly once; whatever that single decode
    /// yields is taken literally.
    pub fn into_set(self) -> BTreeSet<String> {
        match self {
            Self::List(items) => items.into_iter().filter_map(clean).collect(),
            Self::Plain(name) => clean(name).into_iter().collect(),
            Self::Quoted(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::String(inner)) => clean(inner).into_iter().collect(),
                Ok(Value::Array(items)) => items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => clean(s),
                        _ => None,
                    })
                    .collect(),
                _ => {
                    debug!(raw = %raw, "Discarding undecodable role encoding");
                    BTreeSet::new()
                }
            },
            Self::Unrecognized => BTreeSet::new(),
        }
    }
}

/// Normalize any role or permission encoding into a set of plain strings.
pub fn normalize_roles(value: &Value) -> BTreeSet<String> {
    RoleEncoding::classify(value).into_set()
}

/// Build canonical [`UserClaims`] from a loosely structured payload.
///
/// Returns `None` when the payload is not an object or carries no user
/// identifier. Missing role and permission fields become empty sets and an
/// unknown tier becomes `free`.
pub fn normalize_claims(raw: &Value) -> Option<UserClaims> {
    let obj = raw.as_object()?;

    let Some(user_id) = first_scalar(obj, &USER_ID_FIELDS) else {
        debug!("Claims payload has no user identifier");
        return None;
    };

    let roles = first_present(obj, &ROLE_FIELDS)
        .map(normalize_roles)
        .unwrap_or_default();
    let permissions = obj
        .get("permissions")
        .map(normalize_roles)
        .unwrap_or_default();
    let tier = first_scalar(obj, &TIER_FIELDS)
        .map(|t| Tier::parse_lenient(&t))
        .unwrap_or_default();

    Some(UserClaims {
        user_id,
        username: first_scalar(obj, &USERNAME_FIELDS).unwrap_or_default(),
        email: first_scalar(obj, &["email"]).unwrap_or_default(),
        roles,
        permissions,
        company_id: first_scalar(obj, &COMPANY_FIELDS),
        tier,
    })
}

fn clean(name: String) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn first_present<'a>(obj: &'a Map<String, Value>, fields: &[&str]) -> Option<&'a Value> {
    fields
        .iter()
        .filter_map(|f| obj.get(*f))
        .find(|v| !v.is_null())
}

/// First field holding a non-empty string or a number, as a string.
fn first_scalar(obj: &Map<String, Value>, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|f| match obj.get(*f) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_array_encoding() {
        assert_eq!(
            normalize_roles(&json!(["admin", "user", "admin"])),
            set(&["admin", "user"])
        );
        assert_eq!(normalize_roles(&json!(["admin", 7, null])), set(&["admin"]));
    }

    #[test]
    fn test_plain_string() {
        assert_eq!(normalize_roles(&json!("admin")), set(&["admin"]));
        assert_eq!(normalize_roles(&json!("  ")), set(&[]));
    }

    #[test]
    fn test_quoted_string_unwraps_once() {
        assert_eq!(normalize_roles(&json!("\"admin\"")), set(&["admin"]));
        assert_eq!(
            normalize_roles(&json!("[\"admin\",\"company_owner\"]")),
            set(&["admin", "company_owner"])
        );
        // A second level of quoting is kept literally.
        assert_eq!(
            normalize_roles(&json!("\"\\\"admin\\\"\"")),
            set(&["\"admin\""])
        );
    }

    #[test]
    fn test_garbage_yields_empty_set() {
        for garbage in [
            json!(null),
            json!(42),
            json!({"role": "admin"}),
            json!("[admin"),
            json!("\"unterminated"),
            json!(true),
        ] {
            assert!(normalize_roles(&garbage).is_empty(), "{garbage}");
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            RoleEncoding::classify(&json!("user")),
            RoleEncoding::Plain("user".to_string())
        );
        assert!(matches!(
            RoleEncoding::classify(&json!("[\"a\"]")),
            RoleEncoding::Quoted(_)
        ));
        assert_eq!(RoleEncoding::classify(&json!(1.5)), RoleEncoding::Unrecognized);
    }

    #[test]
    fn test_normalize_claims_full_payload() {
        let claims = normalize_claims(&json!({
            "userId": "u-42",
            "username": "grace",
            "email": "grace@example.com",
            "roles": "[\"company_owner\"]",
            "permissions": ["manage:company", "read:links"],
            "companyId": 9,
            "tier": "Premium"
        }))
        .unwrap();

        assert_eq!(claims.user_id, "u-42");
        assert_eq!(claims.username, "grace");
        assert_eq!(claims.roles, set(&["company_owner"]));
        assert_eq!(claims.permissions, set(&["manage:company", "read:links"]));
        assert_eq!(claims.company_id.as_deref(), Some("9"));
        assert_eq!(claims.tier, Tier::Premium);
    }

    #[test]
    fn test_normalize_claims_defaults() {
        let claims = normalize_claims(&json!({ "sub": "u-1", "role": "user" })).unwrap();
        assert_eq!(claims.roles, set(&["user"]));
        assert!(claims.permissions.is_empty());
        assert!(claims.company_id.is_none());
        assert_eq!(claims.tier, Tier::Free);
        assert_eq!(claims.email, "");
    }

    #[test]
    fn test_normalize_claims_rejects_missing_identity() {
        assert!(normalize_claims(&json!({ "username": "nobody" })).is_none());
        assert!(normalize_claims(&json!(["not", "an", "object"])).is_none());
    }
}
