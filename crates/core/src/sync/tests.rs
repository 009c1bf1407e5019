use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use super::*;
use crate::brand::{BrandProfile, Language, Tone};
use crate::errors::{LocalStoreError, RemoteStoreError};
use crate::history::{is_newest_first, ContentKind, HistoryItem, NewHistoryEntry, HISTORY_LIMIT};

fn profile(name: &str) -> BrandProfile {
    BrandProfile {
        business_name: name.to_string(),
        category: "Retail".to_string(),
        city: "Pune".to_string(),
        language: Language::English,
        tone: Tone::Friendly,
        business_description: None,
        api_key: None,
    }
}

/// Local store that can be switched into a failing state mid-test.
#[derive(Default)]
struct FlakyLocalStore {
    values: Mutex<HashMap<String, String>>,
    broken: AtomicBool,
}

impl FlakyLocalStore {
    fn set_broken(&self, broken: bool) {
        self.broken.store(broken, Ordering::SeqCst);
    }

    fn raw(&self, key: &str) -> Option<String> {
        self.values.lock().expect("lock").get(key).cloned()
    }
}

impl LocalStore for FlakyLocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(LocalStoreError::backend("scripted local outage"));
        }
        Ok(self.values.lock().expect("lock").get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(LocalStoreError::backend("scripted local outage"));
        }
        self.values
            .lock()
            .expect("lock")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Scripted remote store: in-memory documents plus a failure switch.
#[derive(Default)]
struct FakeRemoteStore {
    profile: Mutex<Option<BrandProfile>>,
    history: Mutex<Vec<HistoryItem>>,
    failing: AtomicBool,
    appends: AtomicUsize,
}

impl FakeRemoteStore {
    fn failing() -> Self {
        let store = Self::default();
        store.failing.store(true, Ordering::SeqCst);
        store
    }

    fn with_profile(profile: BrandProfile) -> Self {
        let store = Self::default();
        *store.profile.lock().expect("lock") = Some(profile);
        store
    }

    fn with_history(items: Vec<HistoryItem>) -> Self {
        let store = Self::default();
        *store.history.lock().expect("lock") = items;
        store
    }

    fn check(&self) -> Result<(), RemoteStoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(RemoteStoreError::unavailable("scripted outage"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteStore for FakeRemoteStore {
    async fn fetch_profile(
        &self,
        _client_id: &str,
    ) -> Result<Option<BrandProfile>, RemoteStoreError> {
        self.check()?;
        Ok(self.profile.lock().expect("lock").clone())
    }

    async fn store_profile(
        &self,
        _client_id: &str,
        profile: &BrandProfile,
    ) -> Result<(), RemoteStoreError> {
        self.check()?;
        *self.profile.lock().expect("lock") = Some(profile.clone());
        Ok(())
    }

    async fn append_history(
        &self,
        _client_id: &str,
        entry: &NewHistoryEntry,
        timestamp_ms: i64,
    ) -> Result<String, RemoteStoreError> {
        self.check()?;
        let n = self.appends.fetch_add(1, Ordering::SeqCst);
        let id = format!("srv_{}", n);
        let mut history = self.history.lock().expect("lock");
        history.insert(
            0,
            HistoryItem {
                id: id.clone(),
                timestamp: timestamp_ms,
                kind: entry.kind,
                content: entry.content.clone(),
                meta: entry.meta.clone(),
            },
        );
        Ok(id)
    }

    async fn list_history(
        &self,
        _client_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoryItem>, RemoteStoreError> {
        self.check()?;
        let history = self.history.lock().expect("lock");
        Ok(history.iter().take(limit).cloned().collect())
    }
}

fn remote_item(id: &str, timestamp: i64, kind: ContentKind) -> HistoryItem {
    HistoryItem {
        id: id.to_string(),
        timestamp,
        kind,
        content: format!("content-{}", id),
        meta: None,
    }
}

#[test]
fn client_id_is_stable_across_contexts() {
    let local: Arc<dyn LocalStore> = Arc::new(MemoryLocalStore::new());
    let first = StorageContext::new(Arc::clone(&local), None);
    let second = StorageContext::new(Arc::clone(&local), None);
    assert_eq!(first.client_id(), second.client_id());
    assert!(first.client_id().starts_with("user_"));
}

#[tokio::test]
async fn degraded_save_then_load_round_trips() {
    let ctx = StorageContext::new(Arc::new(MemoryLocalStore::new()), None);
    let p = profile("Offline Traders");
    ctx.save_profile(&p).await;
    assert_eq!(ctx.load_profile().await, Some(p));
}

#[tokio::test]
async fn load_profile_prefers_local_when_remote_unreachable() {
    let local = Arc::new(MemoryLocalStore::new());
    let seed = StorageContext::new(Arc::clone(&local) as Arc<dyn LocalStore>, None);
    let p = profile("Cached Kirana");
    seed.save_profile(&p).await;

    let ctx = StorageContext::new(local, Some(Arc::new(FakeRemoteStore::failing())));
    assert_eq!(ctx.load_profile().await, Some(p));
}

#[tokio::test]
async fn remote_profile_overwrites_local_mirror() {
    let local = Arc::new(FlakyLocalStore::default());
    let seed = StorageContext::new(Arc::clone(&local) as Arc<dyn LocalStore>, None);
    seed.save_profile(&profile("Stale Local")).await;

    let remote_profile = profile("Fresh Remote");
    let ctx = StorageContext::new(
        Arc::clone(&local) as Arc<dyn LocalStore>,
        Some(Arc::new(FakeRemoteStore::with_profile(
            remote_profile.clone(),
        ))),
    );

    assert_eq!(ctx.load_profile().await, Some(remote_profile.clone()));

    // The mirror was refreshed, not just the returned value.
    let mirrored: BrandProfile =
        serde_json::from_str(&local.raw(PROFILE_KEY).expect("mirror present")).expect("parse");
    assert_eq!(mirrored, remote_profile);
}

#[tokio::test]
async fn empty_remote_profile_keeps_local_value() {
    let local = Arc::new(MemoryLocalStore::new());
    let seed = StorageContext::new(Arc::clone(&local) as Arc<dyn LocalStore>, None);
    let p = profile("Still Here");
    seed.save_profile(&p).await;

    let ctx = StorageContext::new(local, Some(Arc::new(FakeRemoteStore::default())));
    assert_eq!(ctx.load_profile().await, Some(p));
}

#[tokio::test]
async fn both_stores_absent_means_onboarding() {
    let ctx = StorageContext::new(
        Arc::new(MemoryLocalStore::new()),
        Some(Arc::new(FakeRemoteStore::failing())),
    );
    assert_eq!(ctx.load_profile().await, None);
}

#[tokio::test]
async fn save_profile_swallows_remote_failure() {
    let ctx = StorageContext::new(
        Arc::new(MemoryLocalStore::new()),
        Some(Arc::new(FakeRemoteStore::failing())),
    );
    let p = profile("Best Effort");
    ctx.save_profile(&p).await;
    assert_eq!(ctx.load_profile().await, Some(p));
}

#[tokio::test]
async fn corrupt_profile_mirror_reads_as_absent() {
    let local = Arc::new(MemoryLocalStore::new());
    local.set(PROFILE_KEY, "{not valid json").expect("seed");
    let ctx = StorageContext::new(local, None);
    assert_eq!(ctx.load_profile().await, None);
}

#[tokio::test]
async fn history_is_bounded_to_fifty_most_recent() {
    let ctx = StorageContext::new(Arc::new(MemoryLocalStore::new()), None);
    for n in 0..55 {
        ctx.append_history(NewHistoryEntry::new(
            ContentKind::Post,
            format!("entry-{}", n),
        ))
        .await;
    }

    let list = ctx.load_history().await;
    assert_eq!(list.len(), HISTORY_LIMIT);
    assert_eq!(list[0].content, "entry-54");
    assert_eq!(list[49].content, "entry-5");
    assert!(is_newest_first(&list));
}

#[tokio::test]
async fn remote_history_replaces_local_mirror_in_listed_order() {
    let base = 1_700_000_000_000;
    // Remote delivers timestamp-descending: T+2, T+1, T.
    let remote = FakeRemoteStore::with_history(vec![
        remote_item("r3", base + 2, ContentKind::Reply),
        remote_item("r2", base + 1, ContentKind::Offer),
        remote_item("r1", base, ContentKind::Post),
    ]);

    let local = Arc::new(FlakyLocalStore::default());
    let ctx = StorageContext::new(
        Arc::clone(&local) as Arc<dyn LocalStore>,
        Some(Arc::new(remote)),
    );

    let list = ctx.load_history().await;
    let ids: Vec<&str> = list.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["r3", "r2", "r1"]);
    assert!(is_newest_first(&list));

    let mirrored: Vec<HistoryItem> =
        serde_json::from_str(&local.raw(HISTORY_KEY).expect("mirror present")).expect("parse");
    assert_eq!(mirrored, list);
}

#[tokio::test]
async fn empty_remote_history_keeps_local_list() {
    let local = Arc::new(MemoryLocalStore::new());
    let seed = StorageContext::new(Arc::clone(&local) as Arc<dyn LocalStore>, None);
    seed.append_history(NewHistoryEntry::new(ContentKind::Post, "kept"))
        .await;

    let ctx = StorageContext::new(local, Some(Arc::new(FakeRemoteStore::default())));
    let list = ctx.load_history().await;
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].content, "kept");
}

#[tokio::test]
async fn failed_remote_history_keeps_local_list() {
    let local = Arc::new(MemoryLocalStore::new());
    let seed = StorageContext::new(Arc::clone(&local) as Arc<dyn LocalStore>, None);
    seed.append_history(NewHistoryEntry::new(ContentKind::Broadcast, "survives"))
        .await;

    let ctx = StorageContext::new(local, Some(Arc::new(FakeRemoteStore::failing())));
    let list = ctx.load_history().await;
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].content, "survives");
}

#[tokio::test]
async fn append_returns_server_id_and_mirror_keeps_provisional() {
    let local = Arc::new(FlakyLocalStore::default());
    let ctx = StorageContext::new(
        Arc::clone(&local) as Arc<dyn LocalStore>,
        Some(Arc::new(FakeRemoteStore::default())),
    );

    let item = ctx
        .append_history(
            NewHistoryEntry::new(ContentKind::Offer, "Diwali Dhamaka")
                .with_meta(json!({"product": "Diwali Dhamaka"})),
        )
        .await;

    assert_eq!(item.id, "srv_0");
    assert_eq!(item.meta, Some(json!({"product": "Diwali Dhamaka"})));

    // The mirror was persisted before the remote append and keeps the
    // provisional id; no retroactive rewrite.
    let mirrored: Vec<HistoryItem> =
        serde_json::from_str(&local.raw(HISTORY_KEY).expect("mirror present")).expect("parse");
    assert_eq!(mirrored.len(), 1);
    assert!(mirrored[0].id.starts_with("temp_"));
    assert_eq!(mirrored[0].content, item.content);
}

#[tokio::test]
async fn append_offline_keeps_provisional_id() {
    let ctx = StorageContext::new(
        Arc::new(MemoryLocalStore::new()),
        Some(Arc::new(FakeRemoteStore::failing())),
    );
    let item = ctx
        .append_history(NewHistoryEntry::new(ContentKind::Reply, "thanks ji"))
        .await;
    assert!(item.id.starts_with("temp_"));

    let list = ctx.load_history().await;
    assert_eq!(list[0].id, item.id);
}

#[tokio::test]
async fn append_with_both_stores_down_still_returns_item() {
    let local = Arc::new(FlakyLocalStore::default());
    local.set_broken(true);
    let ctx = StorageContext::new(
        Arc::clone(&local) as Arc<dyn LocalStore>,
        Some(Arc::new(FakeRemoteStore::failing())),
    );

    let item = ctx
        .append_history(NewHistoryEntry::new(ContentKind::Post, "ephemeral"))
        .await;
    assert_eq!(item.content, "ephemeral");

    // The item lived only for that call; nothing was durably stored.
    assert!(ctx.load_history().await.is_empty());
}

#[tokio::test]
async fn replace_remote_upgrades_degraded_context() {
    let mut ctx = StorageContext::new(Arc::new(MemoryLocalStore::new()), None);
    assert!(!ctx.has_remote());

    let remote_profile = profile("Now Connected");
    ctx.replace_remote(Some(Arc::new(FakeRemoteStore::with_profile(
        remote_profile.clone(),
    ))));
    assert!(ctx.has_remote());
    assert_eq!(ctx.load_profile().await, Some(remote_profile));
}
