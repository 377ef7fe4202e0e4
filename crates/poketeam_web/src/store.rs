use poketeam_core::core_api::{
    CoreError, CoreErrorCode, MemoryStore, RosterStore, STORAGE_NAMESPACE,
};

/// `window.localStorage` under one key.
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    storage: web_sys::Storage,
    key: String,
}

impl LocalStorageStore {
    /// `None` outside a browser window or when storage is disabled.
    pub fn open(key: &str) -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self {
            storage,
            key: key.to_string(),
        })
    }
}

impl RosterStore for LocalStorageStore {
    fn load_raw(&self) -> Result<Option<String>, CoreError> {
        self.storage.get_item(&self.key).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Persistence,
                format!("localStorage read failed: {e:?}"),
            )
        })
    }

    fn save_raw(&mut self, raw: &str) -> Result<(), CoreError> {
        self.storage.set_item(&self.key, raw).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Persistence,
                format!("localStorage write failed: {e:?}"),
            )
        })
    }
}

/// Browser storage when available, otherwise a session-only map.
#[derive(Debug, Clone)]
pub enum BrowserStore {
    Local(LocalStorageStore),
    Memory(MemoryStore),
}

impl BrowserStore {
    pub fn detect() -> Self {
        match LocalStorageStore::open(STORAGE_NAMESPACE) {
            Some(store) => Self::Local(store),
            None => {
                tracing::warn!("localStorage unavailable, team will not survive a reload");
                Self::Memory(MemoryStore::new())
            }
        }
    }
}

impl RosterStore for BrowserStore {
    fn load_raw(&self) -> Result<Option<String>, CoreError> {
        match self {
            Self::Local(store) => store.load_raw(),
            Self::Memory(store) => store.load_raw(),
        }
    }

    fn save_raw(&mut self, raw: &str) -> Result<(), CoreError> {
        match self {
            Self::Local(store) => store.save_raw(raw),
            Self::Memory(store) => store.save_raw(raw),
        }
    }
}
