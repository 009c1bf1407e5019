//! Local durable storage contract and the stable key surface.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::errors::LocalStoreError;

/// Device-identity key.
pub const CLIENT_ID_KEY: &str = "mccia_client_id";
/// Profile mirror key.
pub const PROFILE_KEY: &str = "mccia_brand_backup";
/// History mirror key.
pub const HISTORY_KEY: &str = "mccia_history_backup";
/// Manually entered remote-store configuration key.
pub const MANUAL_CONFIG_KEY: &str = "mccia_firebase_config";

/// Durable key-value storage on the device.
///
/// Implementations are synchronous; values are opaque strings (JSON at the
/// typed layer). The key names above are a stable contract shared with
/// existing installs: renaming them orphans previously persisted data.
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError>;
}

/// In-memory [`LocalStore`] for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryLocalStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryLocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        let values = self
            .values
            .lock()
            .map_err(|_| LocalStoreError::backend("memory store lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| LocalStoreError::backend("memory store lock poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
