//! Remote document store contract.

use async_trait::async_trait;

use crate::brand::BrandProfile;
use crate::errors::RemoteStoreError;
use crate::history::{HistoryItem, NewHistoryEntry};

/// Asynchronous per-device document store.
///
/// Every operation is independently failable; the reconciler treats any
/// failure as "fall back to local" and never aborts the caller's overall
/// operation because of it.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the profile document scoped by `client_id`.
    async fn fetch_profile(
        &self,
        client_id: &str,
    ) -> Result<Option<BrandProfile>, RemoteStoreError>;

    /// Full-replace write of the profile document.
    async fn store_profile(
        &self,
        client_id: &str,
        profile: &BrandProfile,
    ) -> Result<(), RemoteStoreError>;

    /// Append one history entry and return the server-assigned id.
    async fn append_history(
        &self,
        client_id: &str,
        entry: &NewHistoryEntry,
        timestamp_ms: i64,
    ) -> Result<String, RemoteStoreError>;

    /// Newest-first history for the device, at most `limit` items.
    async fn list_history(
        &self,
        client_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoryItem>, RemoteStoreError>;
}
