//! [`RemoteStore`] implementation over the Firestore client.

use async_trait::async_trait;
use chrono::Utc;
use log::warn;
use serde_json::{Map, Value};

use postmitra_core::brand::BrandProfile;
use postmitra_core::config::RemoteConfig;
use postmitra_core::errors::RemoteStoreError;
use postmitra_core::history::{self, ContentKind, HistoryItem, NewHistoryEntry};
use postmitra_core::sync::RemoteStore;

use crate::client::{Document, FirestoreClient};
use crate::error::FirestoreError;
use crate::value::{
    from_firestore_fields, millis_from_timestamp, timestamp_value_from_millis, to_firestore_fields,
    to_firestore_value,
};

const USERS_COLLECTION: &str = "users";
const HISTORY_COLLECTION: &str = "history";

/// Per-device document layout:
/// profile at `users/{client_id}`, history under
/// `users/{client_id}/history` ordered by its `timestamp` field.
pub struct FirestoreRemoteStore {
    client: FirestoreClient,
}

impl FirestoreRemoteStore {
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            client: FirestoreClient::new(config),
        }
    }

    /// Against a non-default endpoint, mainly for tests.
    pub fn with_base_url(config: &RemoteConfig, base_url: &str) -> Self {
        Self {
            client: FirestoreClient::with_base_url(config, base_url),
        }
    }

    fn profile_path(client_id: &str) -> String {
        format!("{}/{}", USERS_COLLECTION, client_id)
    }

    fn decode_profile(document: &Document) -> Result<BrandProfile, FirestoreError> {
        let plain = Value::Object(from_firestore_fields(&document.fields));
        serde_json::from_value(plain)
            .map_err(|e| FirestoreError::malformed(format!("profile document: {}", e)))
    }

    fn decode_history_item(document: &Document) -> Option<HistoryItem> {
        let plain = from_firestore_fields(&document.fields);

        let kind: ContentKind = match plain
            .get("type")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
        {
            Some(kind) => kind,
            None => {
                warn!(
                    "Skipping history document {} with unknown type",
                    document.id()
                );
                return None;
            }
        };

        // A document missing its timestamp still renders; it just sorts as
        // "now", matching the original client's behavior.
        let timestamp = plain
            .get("timestamp")
            .and_then(Value::as_str)
            .and_then(millis_from_timestamp)
            .unwrap_or_else(|| Utc::now().timestamp_millis());

        Some(HistoryItem {
            id: document.id().to_string(),
            timestamp,
            kind,
            content: plain
                .get("content")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            meta: plain.get("meta").filter(|v| !v.is_null()).cloned(),
        })
    }
}

#[async_trait]
impl RemoteStore for FirestoreRemoteStore {
    async fn fetch_profile(
        &self,
        client_id: &str,
    ) -> Result<Option<BrandProfile>, RemoteStoreError> {
        let document = self
            .client
            .get_document(&Self::profile_path(client_id))
            .await
            .map_err(RemoteStoreError::from)?;

        match document {
            Some(document) => {
                let profile = Self::decode_profile(&document).map_err(RemoteStoreError::from)?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    async fn store_profile(
        &self,
        client_id: &str,
        profile: &BrandProfile,
    ) -> Result<(), RemoteStoreError> {
        let plain = serde_json::to_value(profile)
            .map_err(|e| RemoteStoreError::invalid_document(e.to_string()))?;
        let mut fields = match plain {
            Value::Object(map) => to_firestore_fields(&map),
            _ => Map::new(),
        };
        fields.insert(
            "updatedAt".to_string(),
            timestamp_value_from_millis(Utc::now().timestamp_millis()),
        );

        self.client
            .patch_document(&Self::profile_path(client_id), fields)
            .await
            .map_err(RemoteStoreError::from)?;
        Ok(())
    }

    async fn append_history(
        &self,
        client_id: &str,
        entry: &NewHistoryEntry,
        timestamp_ms: i64,
    ) -> Result<String, RemoteStoreError> {
        let mut fields = Map::new();
        fields.insert(
            "type".to_string(),
            to_firestore_value(&Value::String(entry.kind.to_string())),
        );
        fields.insert(
            "content".to_string(),
            to_firestore_value(&Value::String(entry.content.clone())),
        );
        if let Some(meta) = &entry.meta {
            fields.insert("meta".to_string(), to_firestore_value(meta));
        }
        fields.insert(
            "timestamp".to_string(),
            timestamp_value_from_millis(timestamp_ms),
        );

        let document = self
            .client
            .create_document(&Self::profile_path(client_id), HISTORY_COLLECTION, fields)
            .await
            .map_err(RemoteStoreError::from)?;
        Ok(document.id().to_string())
    }

    async fn list_history(
        &self,
        client_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoryItem>, RemoteStoreError> {
        let documents = self
            .client
            .run_query(
                &Self::profile_path(client_id),
                HISTORY_COLLECTION,
                "timestamp",
                true,
                limit,
            )
            .await
            .map_err(RemoteStoreError::from)?;

        let mut items: Vec<HistoryItem> = documents
            .iter()
            .filter_map(Self::decode_history_item)
            .collect();
        // The query is already descending; re-sorting keeps the contract
        // intact when stamp-less documents were defaulted to "now".
        history::sort_newest_first(&mut items);
        items.truncate(limit);
        Ok(items)
    }
}
