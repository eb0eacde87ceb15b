//! Store manager that dispatches to the configured backend.

use std::sync::Arc;

use tracing::info;

use tenantgate_core::config::{SessionConfig, StoreBackend};
use tenantgate_core::error::AppError;
use tenantgate_core::result::AppResult;
use tenantgate_core::traits::session_store::SessionStore;

/// Store manager that wraps the configured session store backend.
///
/// The backend is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct StoreManager {
    /// The inner store.
    inner: Arc<dyn SessionStore>,
}

impl StoreManager {
    /// Create a store manager from configuration.
    pub fn new(config: &SessionConfig) -> AppResult<Self> {
        let inner: Arc<dyn SessionStore> = match config.store {
            #[cfg(feature = "file")]
            StoreBackend::File => {
                info!(path = %config.store_path, "Initializing file session store");
                Arc::new(crate::file::FileSessionStore::new(&config.store_path))
            }
            #[cfg(feature = "memory")]
            StoreBackend::Memory => {
                info!("Initializing in-memory session store");
                Arc::new(crate::memory::MemorySessionStore::new())
            }
            #[allow(unreachable_patterns)]
            other => {
                return Err(AppError::configuration(format!(
                    "Session store backend '{other}' is not compiled in"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a store manager from an existing store (for testing).
    pub fn from_store(store: Arc<dyn SessionStore>) -> Self {
        Self { inner: store }
    }

    /// Get a shared handle to the inner store.
    pub fn store(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.inner)
    }
}

impl SessionStore for StoreManager {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key)
    }
}
