//! Generation history: the bounded, newest-first list of past results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum retained history entries. Oldest items beyond the cap are
/// discarded on every insert.
pub const HISTORY_LIMIT: usize = 50;

/// Kind of generated content a history item records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Post,
    Offer,
    Reply,
    Broadcast,
    Prompt,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentKind::Post => "post",
            ContentKind::Offer => "offer",
            ContentKind::Reply => "reply",
            ContentKind::Broadcast => "broadcast",
            ContentKind::Prompt => "prompt",
        };
        write!(f, "{}", name)
    }
}

/// One immutable record of a past generation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    /// Unique within the list. Server-assigned when the remote append
    /// succeeded first, otherwise a locally generated provisional id.
    pub id: String,
    /// Epoch milliseconds. Non-increasing head-to-tail across the list.
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    /// Generated text; structured outputs are stored as serialized JSON.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

/// Payload for a new history entry, before the reconciler assigns an id
/// and timestamp.
#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
    pub kind: ContentKind,
    pub content: String,
    pub meta: Option<serde_json::Value>,
}

impl NewHistoryEntry {
    pub fn new(kind: ContentKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Prepend `item` and drop anything beyond [`HISTORY_LIMIT`].
pub fn prepend_bounded(list: &mut Vec<HistoryItem>, item: HistoryItem) {
    list.insert(0, item);
    list.truncate(HISTORY_LIMIT);
}

/// True when every adjacent pair satisfies `timestamp[i] >= timestamp[i+1]`.
pub fn is_newest_first(list: &[HistoryItem]) -> bool {
    list.windows(2).all(|pair| pair[0].timestamp >= pair[1].timestamp)
}

/// Sort newest-first by timestamp. Stable, so equal stamps keep their
/// relative order.
pub fn sort_newest_first(list: &mut [HistoryItem]) {
    list.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}
