//! The ordered route policy table.

use std::collections::BTreeMap;

use tracing::debug;

use tenantgate_core::result::AppResult;
use tenantgate_core::types::RoutePolicy;

use super::pattern::RoutePattern;

/// A policy entry together with its compiled pattern.
#[derive(Debug, Clone)]
struct CompiledPolicy {
    policy: RoutePolicy,
    pattern: RoutePattern,
}

/// The entry that matched a path and the values of its named segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyMatch<'a> {
    /// Matching entry.
    pub policy: &'a RoutePolicy,
    /// `:name` segment values.
    pub params: BTreeMap<String, String>,
}

/// Ordered policy table. The first entry whose pattern fully matches a
/// path is authoritative, even when a later entry is more specific, so
/// specific paths must be declared ahead of general ones.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    entries: Vec<CompiledPolicy>,
}

impl PolicyTable {
    /// Compile a table, preserving declaration order.
    pub fn new(policies: Vec<RoutePolicy>) -> AppResult<Self> {
        let entries = policies
            .into_iter()
            .map(|policy| {
                let pattern = RoutePattern::compile(&policy.path)?;
                Ok(CompiledPolicy { policy, pattern })
            })
            .collect::<AppResult<Vec<_>>>()?;

        debug!(entries = entries.len(), "Route policy table compiled");
        Ok(Self { entries })
    }

    /// The first entry matching `path`, or `None` when no entry matches.
    pub fn find_policy(&self, path: &str) -> Option<&RoutePolicy> {
        let path = strip_query(path);
        self.entries
            .iter()
            .find(|entry| entry.pattern.is_match(path))
            .map(|entry| &entry.policy)
    }

    /// Like [`find_policy`](Self::find_policy), also returning segment values.
    pub fn find_match(&self, path: &str) -> Option<PolicyMatch<'_>> {
        let path = strip_query(path);
        self.entries.iter().find_map(|entry| {
            entry.pattern.captures(path).map(|params| PolicyMatch {
                policy: &entry.policy,
                params,
            })
        })
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &RoutePolicy> {
        self.entries.iter().map(|entry| &entry.policy)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Drop any query string or fragment from a requested path.
fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}
