//! Connection bootstrap for the local mirror database.

use std::path::Path;

use rusqlite::Connection;

use crate::errors::StorageError;

/// Open (and initialize if needed) the mirror database at `path`.
pub fn open(path: &Path) -> Result<Connection, StorageError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| StorageError::Path(format!("{}: {}", parent.display(), e)))?;
    }
    let conn = Connection::open(path)?;
    init(&conn)?;
    Ok(conn)
}

/// Open an in-memory database, mainly for tests.
pub fn open_in_memory() -> Result<Connection, StorageError> {
    let conn = Connection::open_in_memory()?;
    init(&conn)?;
    Ok(conn)
}

fn init(conn: &Connection) -> Result<(), StorageError> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv (
            key        TEXT PRIMARY KEY,
            value      TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );",
    )?;
    Ok(())
}
