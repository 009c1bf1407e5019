//! Assembly of the storage context from platform paths and configuration.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use log::debug;

use postmitra_core::config::{self, RemoteConfig};
use postmitra_core::sync::{LocalStore, RemoteStore};
use postmitra_firestore::FirestoreRemoteStore;
use postmitra_storage_sqlite::SqliteStore;

const DATA_DIR_ENV: &str = "POSTMITRA_DATA_DIR";

/// Platform data directory, overridable via `POSTMITRA_DATA_DIR`.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("postmitra")
}

pub fn open_local_store() -> Result<SqliteStore> {
    let path = data_dir().join("postmitra.db");
    SqliteStore::open(&path)
        .with_context(|| format!("opening local mirror at {}", path.display()))
}

/// Build the remote handle from the resolved configuration.
///
/// `None` (no usable configuration anywhere) means degraded local-only
/// mode; the app stays fully functional against the local mirror.
pub fn build_remote(local: &dyn LocalStore) -> Option<Arc<dyn RemoteStore>> {
    let config = config::resolve_remote_config(local)?;
    debug!("Remote store configured for project {}", config.project_id);
    Some(Arc::new(FirestoreRemoteStore::new(&config)))
}

/// Remote handle for a configuration that was just saved.
pub fn remote_from_config(config: &RemoteConfig) -> Arc<dyn RemoteStore> {
    Arc::new(FirestoreRemoteStore::new(config))
}
