use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::error::{CoreError, CoreErrorCode};
use super::types::RosterEntry;
use super::well_known::STORAGE_NAMESPACE;

/// The persisted record: only the roster array, nothing derived.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedRoster {
    #[serde(default)]
    pub team: Vec<RosterEntry>,
}

/// Durable key-value substrate for one namespaced record.
pub trait RosterStore {
    /// `Ok(None)` when nothing was ever saved.
    fn load_raw(&self) -> Result<Option<String>, CoreError>;

    fn save_raw(&mut self, raw: &str) -> Result<(), CoreError>;

    /// Decode the stored record. An undecodable record is logged and reads
    /// as empty so a corrupt store never blocks startup.
    fn load(&self) -> Result<PersistedRoster, CoreError> {
        let Some(raw) = self.load_raw()? else {
            return Ok(PersistedRoster::default());
        };
        match serde_json::from_str(&raw) {
            Ok(roster) => Ok(roster),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable stored team");
                Ok(PersistedRoster::default())
            }
        }
    }

    fn save(&mut self, roster: &PersistedRoster) -> Result<(), CoreError> {
        let raw = serde_json::to_string(roster).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Persistence,
                format!("failed to encode team: {e}"),
            )
        })?;
        self.save_raw(&raw)
    }
}

/// One JSON file per namespace inside a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path, namespace: &str) -> Self {
        Self::new(dir.join(format!("{namespace}.json")))
    }

    /// Default location under the platform data directory.
    pub fn default_location() -> Option<Self> {
        dirs::data_dir().map(|dir| Self::in_dir(&dir.join("poketeam"), STORAGE_NAMESPACE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RosterStore for JsonFileStore {
    fn load_raw(&self) -> Result<Option<String>, CoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::new(
                CoreErrorCode::Io,
                format!("failed to read {}: {e}", self.path.display()),
            )),
        }
    }

    fn save_raw(&mut self, raw: &str) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CoreError::new(
                    CoreErrorCode::Io,
                    format!("failed to create {}: {e}", parent.display()),
                )
            })?;
        }
        fs::write(&self.path, raw).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("failed to write {}: {e}", self.path.display()),
            )
        })
    }
}

/// In-process store. Clones share the same backing map, so a test can keep a
/// handle and inspect what a session wrote.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    namespace: String,
    records: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            namespace: STORAGE_NAMESPACE.to_string(),
            records: Arc::default(),
        }
    }

    pub fn with_raw(raw: impl Into<String>) -> Self {
        let store = Self::new();
        store
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(store.namespace.clone(), raw.into());
        store
    }

    pub fn raw(&self) -> Option<String> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&self.namespace)
            .cloned()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RosterStore for MemoryStore {
    fn load_raw(&self) -> Result<Option<String>, CoreError> {
        Ok(self.raw())
    }

    fn save_raw(&mut self, raw: &str) -> Result<(), CoreError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(self.namespace.clone(), raw.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_as_empty_roster() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::in_dir(dir.path(), STORAGE_NAMESPACE);
        let loaded = store.load().expect("load should succeed");
        assert!(loaded.team.is_empty());
    }

    #[test]
    fn corrupt_record_loads_as_empty_roster() {
        let store = MemoryStore::with_raw("{not json");
        let loaded = store.load().expect("corrupt store is not an error");
        assert!(loaded.team.is_empty());
    }

    #[test]
    fn file_store_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = JsonFileStore::new(dir.path().join("nested/deeper/team.json"));
        store
            .save(&PersistedRoster::default())
            .expect("save should create directories");
        assert_eq!(
            fs::read_to_string(store.path()).expect("file written"),
            r#"{"team":[]}"#
        );
    }
}
