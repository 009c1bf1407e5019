//! Stable per-device identity used to scope remote documents.

use log::warn;
use rand::Rng;

use crate::sync::{LocalStore, CLIENT_ID_KEY};

const CLIENT_ID_SUFFIX_LEN: usize = 13;

/// Return the persisted client id, generating and storing one on first use.
///
/// Every later call in the same or a later process lifetime returns the
/// identical value. When local persistence is unavailable a fresh id is
/// handed out per call; the caller keeps running, but remote documents
/// are no longer scoped to a stable device, so this is logged loudly.
pub fn ensure_client_id(local: &dyn LocalStore) -> String {
    match local.get(CLIENT_ID_KEY) {
        Ok(Some(id)) if !id.trim().is_empty() => return id,
        Ok(_) => {}
        Err(err) => warn!("Failed to read client id: {}", err),
    }

    let id = generate_client_id();
    if let Err(err) = local.set(CLIENT_ID_KEY, &id) {
        warn!(
            "Failed to persist client id {}; remote scoping will not survive this process: {}",
            id, err
        );
    }
    id
}

fn generate_client_id() -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..CLIENT_ID_SUFFIX_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("user_{}", suffix)
}
