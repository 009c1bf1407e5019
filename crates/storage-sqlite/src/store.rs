//! The [`LocalStore`] implementation over the kv table.

use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

use postmitra_core::errors::LocalStoreError;
use postmitra_core::sync::LocalStore;

use crate::db;
use crate::errors::StorageError;

/// Durable key-value store backed by a single sqlite file.
///
/// The connection sits behind a mutex: the reconciler is driven from a
/// single control flow, so there is no contention to speak of.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open the store at `path`, creating the file and schema on first use.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        debug!("Opening local mirror at {}", path.display());
        Ok(Self {
            conn: Mutex::new(db::open(path)?),
        })
    }

    /// In-memory store, mainly for tests.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Ok(Self {
            conn: Mutex::new(db::open_in_memory()?),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, LocalStoreError> {
        self.conn
            .lock()
            .map_err(|_| LocalStoreError::backend("sqlite connection lock poisoned"))
    }
}

impl LocalStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        let conn = self.lock()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
            .map_err(StorageError::from)?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )
        .map_err(StorageError::from)?;
        Ok(())
    }
}
