//! Defensive JSON helpers.

use log::warn;
use serde::de::DeserializeOwned;

/// Parse `text` into `T`, falling back to `T::default()` when the payload
/// is unusable.
///
/// Used uniformly for structured generation responses: a malformed backend
/// reply renders as an empty state instead of an error.
pub fn parse_or_default<T: DeserializeOwned + Default>(text: &str) -> T {
    match serde_json::from_str(text) {
        Ok(value) => value,
        Err(err) => {
            warn!("Structured payload did not parse, using default: {}", err);
            T::default()
        }
    }
}
