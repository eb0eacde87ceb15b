//! Compilation of route path patterns into anchored regular expressions.

use std::collections::BTreeMap;

use regex::Regex;

use tenantgate_core::error::AppError;
use tenantgate_core::result::AppResult;

/// Matches exactly one non-empty path segment.
const SEGMENT_WILDCARD: &str = "([^/]+)";

/// A compiled route pattern such as `/company/:companyId/settings`.
///
/// Literal segments match themselves; `:name` segments match exactly one
/// path segment. The whole path must match.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    /// Pattern as written in the table.
    source: String,
    /// Fully anchored expression.
    regex: Regex,
    /// Names of the `:name` segments, in order.
    params: Vec<String>,
}

impl RoutePattern {
    /// Compile a pattern.
    pub fn compile(pattern: &str) -> AppResult<Self> {
        let mut expr = String::with_capacity(pattern.len() + 16);
        let mut params = Vec::new();
        expr.push('^');

        for (index, segment) in pattern.split('/').enumerate() {
            if index > 0 {
                expr.push('/');
            }
            match segment.strip_prefix(':') {
                Some("") => {
                    return Err(AppError::configuration(format!(
                        "Route pattern '{pattern}' has an unnamed ':' segment"
                    )));
                }
                Some(name) => {
                    params.push(name.to_string());
                    expr.push_str(SEGMENT_WILDCARD);
                }
                None => expr.push_str(&regex::escape(segment)),
            }
        }
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|e| {
            AppError::configuration(format!("Invalid route pattern '{pattern}': {e}"))
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
            params,
        })
    }

    /// Whether `path` fully matches.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Named segment values, if `path` matches.
    pub fn captures(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let caps = self.regex.captures(path)?;
        Some(
            self.params
                .iter()
                .zip(caps.iter().skip(1))
                .filter_map(|(name, m)| m.map(|m| (name.clone(), m.as_str().to_string())))
                .collect(),
        )
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}
