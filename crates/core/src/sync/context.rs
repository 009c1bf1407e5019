//! The storage reconciler.
//!
//! One mutable profile and one bounded history list per device, mirrored
//! across local durable storage and an optional remote document store.
//! Consistency policy: local-first reads for availability, remote value
//! wins when reachable and non-empty, writes are local-first with a
//! best-effort remote follow-up.

use std::sync::Arc;

use chrono::Utc;
use log::{debug, warn};
use uuid::Uuid;

use crate::brand::BrandProfile;
use crate::history::{self, HistoryItem, NewHistoryEntry, HISTORY_LIMIT};
use crate::identity;
use crate::sync::{LocalStore, RemoteStore, HISTORY_KEY, PROFILE_KEY};

/// Explicitly constructed storage context: the local mirror, the optional
/// remote handle, and the device id scoping remote documents.
///
/// `remote == None` is degraded local-only mode, not an error. The context
/// exclusively owns reconciliation; no other component writes to either
/// store directly.
pub struct StorageContext {
    local: Arc<dyn LocalStore>,
    remote: Option<Arc<dyn RemoteStore>>,
    client_id: String,
}

impl StorageContext {
    pub fn new(local: Arc<dyn LocalStore>, remote: Option<Arc<dyn RemoteStore>>) -> Self {
        let client_id = identity::ensure_client_id(local.as_ref());
        Self {
            local,
            remote,
            client_id,
        }
    }

    /// Stable device id used to scope remote documents.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Tear down and rebuild the remote side in place, e.g. after a manual
    /// configuration save. Local mirror and device id are untouched; no
    /// process restart is required.
    pub fn replace_remote(&mut self, remote: Option<Arc<dyn RemoteStore>>) {
        self.remote = remote;
    }

    /// Load the profile.
    ///
    /// The local mirror answers when the remote store is unconfigured or
    /// unreachable. A remote document, when one exists, overwrites the
    /// local mirror and becomes the value for the rest of the session.
    /// `None` means onboarding is required.
    pub async fn load_profile(&self) -> Option<BrandProfile> {
        let local_value = self.read_local_json::<BrandProfile>(PROFILE_KEY);

        let Some(remote) = self.remote.as_ref() else {
            return local_value;
        };

        match remote.fetch_profile(&self.client_id).await {
            Ok(Some(profile)) => {
                self.write_local_json(PROFILE_KEY, &profile);
                Some(profile)
            }
            Ok(None) => local_value,
            Err(err) => {
                warn!("Remote profile read failed, keeping local copy: {}", err);
                local_value
            }
        }
    }

    /// Full-replace save.
    ///
    /// Local write first, then a best-effort remote write whose failure is
    /// logged and swallowed. There is no rollback of the local write: the
    /// operation succeeds from the caller's point of view as long as it
    /// was attempted.
    pub async fn save_profile(&self, profile: &BrandProfile) {
        self.write_local_json(PROFILE_KEY, profile);

        let Some(remote) = self.remote.as_ref() else {
            return;
        };
        if let Err(err) = remote.store_profile(&self.client_id, profile).await {
            warn!(
                "Remote profile write failed; local copy is authoritative: {}",
                err
            );
        }
    }

    /// Load history, newest-first, at most [`HISTORY_LIMIT`] items.
    ///
    /// A non-empty remote result refreshes the local mirror and is
    /// returned; an empty result or a remote failure leaves the local list
    /// in place. With neither store available the list is empty.
    pub async fn load_history(&self) -> Vec<HistoryItem> {
        let local_list = self
            .read_local_json::<Vec<HistoryItem>>(HISTORY_KEY)
            .unwrap_or_default();

        let Some(remote) = self.remote.as_ref() else {
            return local_list;
        };

        match remote.list_history(&self.client_id, HISTORY_LIMIT).await {
            Ok(list) if !list.is_empty() => {
                self.write_local_json(HISTORY_KEY, &list);
                list
            }
            Ok(_) => local_list,
            Err(err) => {
                warn!("Remote history read failed, keeping local list: {}", err);
                local_list
            }
        }
    }

    /// Append a new history item.
    ///
    /// The item gets a provisional id and the current time, is prepended
    /// to the local mirror, bounded to [`HISTORY_LIMIT`] and persisted,
    /// all before any remote attempt, so the caller always sees it even
    /// offline. A successful remote append swaps the server-assigned id
    /// onto the returned item only; the local mirror keeps the provisional
    /// id. On remote failure the provisional id stands permanently.
    pub async fn append_history(&self, entry: NewHistoryEntry) -> HistoryItem {
        let timestamp = Utc::now().timestamp_millis();
        let mut item = HistoryItem {
            id: provisional_id(),
            timestamp,
            kind: entry.kind,
            content: entry.content.clone(),
            meta: entry.meta.clone(),
        };

        let mut list = self
            .read_local_json::<Vec<HistoryItem>>(HISTORY_KEY)
            .unwrap_or_default();
        history::prepend_bounded(&mut list, item.clone());
        self.write_local_json(HISTORY_KEY, &list);

        let Some(remote) = self.remote.as_ref() else {
            return item;
        };
        match remote.append_history(&self.client_id, &entry, timestamp).await {
            Ok(server_id) => {
                debug!("Remote history append accepted, server id {}", server_id);
                item.id = server_id;
            }
            Err(err) => {
                warn!(
                    "Remote history append failed; provisional id {} stands: {}",
                    item.id, err
                );
            }
        }
        item
    }

    fn read_local_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.local.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!("Local read of '{}' failed: {}", key, err);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                // Corrupt mirror reloads as absent rather than crashing.
                warn!(
                    "Stored value under '{}' is corrupt, treating as absent: {}",
                    key, err
                );
                None
            }
        }
    }

    fn write_local_json<T: serde::Serialize>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("Failed to serialize value for '{}': {}", key, err);
                return;
            }
        };
        if let Err(err) = self.local.set(key, &raw) {
            warn!("Local write of '{}' failed: {}", key, err);
        }
    }
}

fn provisional_id() -> String {
    format!("temp_{}", Uuid::new_v4().simple())
}
