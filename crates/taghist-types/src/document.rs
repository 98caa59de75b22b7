use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entry::{EntryKey, ValueEntry};
use crate::hash::ContentHash;
use crate::tag::TagId;

/// Inclusive chronological bounds of one period bucket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub start: EntryKey,
    pub end: EntryKey,
}

impl Period {
    pub fn new(start: impl Into<EntryKey>, end: impl Into<EntryKey>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Whether a key's day falls inside this period.
    pub fn contains(&self, key: &EntryKey) -> bool {
        let day = key.day_prefix();
        self.start.as_str() <= day && day <= self.end.as_str()
    }
}

/// Bucket metadata of a document: entry count, period bounds, and the
/// aggregate hash over the ordered per-entry hashes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreMeta {
    pub count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<ContentHash>,
}

/// Deterministic identity of one persisted document.
///
/// Historized buckets are addressed as `<tagId>/<periodStart>` so that
/// concurrent writers targeting the same tag and period converge on the
/// same document without coordination. Pure current-value documents use the
/// `<tagId>/current` slot.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    const CURRENT_SLOT: &'static str = "current";

    /// Identity of the bucket opened at `period_start` for `tag`.
    pub fn bucket(tag: &TagId, period_start: &EntryKey) -> Self {
        Self(format!("{}/{}", tag, period_start))
    }

    /// Identity of the single current-value document for `tag`.
    pub fn current(tag: &TagId) -> Self {
        Self(format!("{}/{}", tag, Self::CURRENT_SLOT))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The persisted unit: one period bucket of readings for one tag.
///
/// `values` is kept in descending key order (newest first). `store_start`
/// and `store_end` are the smallest and largest key currently present.
/// `store.hash` fingerprints the ordered list of per-entry hashes as of the
/// last server-side recomputation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueDocument {
    pub tag_id: TagId,
    pub tag_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_start: Option<EntryKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_end: Option<EntryKey>,
    pub values: Vec<ValueEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreMeta>,
}

impl ValueDocument {
    /// Whether this document participates in historization (carries period
    /// bounds) as opposed to holding a single current value.
    pub fn is_historized(&self) -> bool {
        self.store_start.is_some()
    }

    /// The storage identity of this document.
    pub fn id(&self) -> DocumentId {
        match self.store.as_ref().and_then(|s| s.period.as_ref()) {
            Some(period) => DocumentId::bucket(&self.tag_id, &period.start),
            None => DocumentId::current(&self.tag_id),
        }
    }

    /// The ordered per-entry hashes, in stored (descending) order.
    ///
    /// Returns `None` if any entry is missing its hash stamp.
    pub fn entry_hashes(&self) -> Option<Vec<ContentHash>> {
        self.values.iter().map(|e| e.hash).collect()
    }
}
