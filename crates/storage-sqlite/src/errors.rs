//! Error types for the sqlite storage crate.

use postmitra_core::errors::LocalStoreError;
use thiserror::Error;

/// Errors raised by the sqlite backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("storage path error: {0}")]
    Path(String),
}

impl From<StorageError> for LocalStoreError {
    fn from(err: StorageError) -> Self {
        LocalStoreError::backend(err.to_string())
    }
}
