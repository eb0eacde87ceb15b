//! Persisted session store trait.

use crate::result::AppResult;

/// Opaque key-value persistence for the session (access token, refresh
/// token, serialized claims).
///
/// Access is synchronous so a session can be hydrated before any async
/// work starts. No transactional guarantees are assumed: each call stands
/// alone, and another process may change a key between two calls.
pub trait SessionStore: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist.
    fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value.
    fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Delete a key. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> AppResult<()>;

    /// Delete several keys, stopping at the first failure.
    fn delete_all(&self, keys: &[&str]) -> AppResult<()> {
        for key in keys {
            self.delete(key)?;
        }
        Ok(())
    }
}
