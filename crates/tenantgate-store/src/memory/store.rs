//! In-memory session store implementation using the dashmap crate.

use std::sync::Arc;

use dashmap::DashMap;

use tenantgate_core::result::AppResult;
use tenantgate_core::traits::session_store::SessionStore;

/// In-memory session store.
///
/// Clones share the same map, which lets tests simulate a second tab
/// writing to the store behind the session manager's back.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    /// The underlying map.
    entries: Arc<DashMap<String, String>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}
