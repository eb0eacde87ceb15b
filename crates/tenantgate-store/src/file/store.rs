//! Session store persisted as a single JSON object on disk.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use tenantgate_core::error::AppError;
use tenantgate_core::result::AppResult;
use tenantgate_core::traits::session_store::SessionStore;

/// File-backed session store.
///
/// The file is re-read on every access, so a value written by another
/// process is picked up on the next `get`. Writes go to a sibling temp
/// file that is then renamed over the original.
#[derive(Debug)]
pub struct FileSessionStore {
    /// Location of the JSON file.
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    /// Create a store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> AppResult<Map<String, Value>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(AppError::with_source(
                    tenantgate_core::error::ErrorKind::Storage,
                    format!("Failed to read session file {}: {e}", self.path.display()),
                    e,
                ));
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                warn!(path = %self.path.display(), "Session file is malformed, treating as empty");
                Ok(Map::new())
            }
        }
    }

    fn write_map(&self, map: &Map<String, Value>) -> AppResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(map)?;
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), keys = map.len(), "Session file written");
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let map = self.read_map()?;
        Ok(map.get(key).and_then(Value::as_str).map(String::from))
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let _guard = self.write_lock.lock();
        let mut map = self.read_map()?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.write_map(&map)
    }

    fn delete(&self, key: &str) -> AppResult<()> {
        let _guard = self.write_lock.lock();
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}
