//! Error types for the core crate.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Remote-store credentials missing or invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Local durable storage failed
    #[error("Local storage error: {0}")]
    LocalStore(#[from] LocalStoreError),

    /// Remote document store failed
    #[error("Remote store error: {0}")]
    RemoteStore(#[from] RemoteStoreError),

    /// Profile failed required-field validation
    #[error("Invalid profile: {0}")]
    Profile(String),
}

/// Problems with a remote-store configuration, surfaced at the point of
/// attempted use (manual save), never during load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("configuration is neither JSON nor a pasteable config object")]
    Unparseable,

    #[error("configuration is missing required field '{0}'")]
    MissingField(&'static str),
}

/// Local durable storage failures.
#[derive(Debug, Error)]
pub enum LocalStoreError {
    /// The storage backend rejected the operation.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// Stored data failed to parse. Callers treat the value as absent.
    #[error("stored value under '{key}' is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
}

impl LocalStoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    pub fn corrupt(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Remote document store failures. Always caught at the reconciler
/// boundary and downgraded to "fall back to local"; never surfaced as a
/// failure of the caller's overall operation.
#[derive(Debug, Error)]
pub enum RemoteStoreError {
    /// Network or transport failure
    #[error("remote store unreachable: {0}")]
    Unavailable(String),

    /// Non-success response from the store API
    #[error("remote store API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The document exists but does not decode into the expected shape
    #[error("remote document malformed: {0}")]
    InvalidDocument(String),
}

impl RemoteStoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument(message.into())
    }

    /// HTTP status if this is an API error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
