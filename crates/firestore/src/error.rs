//! Error types for the Firestore adapter.

use postmitra_core::errors::RemoteStoreError;
use thiserror::Error;

/// Result type alias for Firestore operations.
pub type Result<T> = std::result::Result<T, FirestoreError>;

/// Errors that can occur talking to the Firestore REST API.
#[derive(Debug, Error)]
pub enum FirestoreError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API error response from the store
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A document decoded but not into the expected shape
    #[error("Malformed document: {0}")]
    MalformedDocument(String),
}

impl FirestoreError {
    /// Create an API error from status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDocument(message.into())
    }

    /// HTTP status if this is an API error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<FirestoreError> for RemoteStoreError {
    fn from(err: FirestoreError) -> Self {
        match err {
            FirestoreError::Http(e) => RemoteStoreError::unavailable(e.to_string()),
            FirestoreError::Json(e) => RemoteStoreError::invalid_document(e.to_string()),
            FirestoreError::Api { status, message } => RemoteStoreError::api(status, message),
            FirestoreError::MalformedDocument(m) => RemoteStoreError::invalid_document(m),
        }
    }
}
