use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::hash::ContentHash;

/// Sortable chronological key of one entry.
///
/// Keys are strings whose lexicographic order is chronological order, e.g.
/// an ISO-8601 timestamp or a `YYYY-MM-DD` day string. Within one document
/// every entry key is unique.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryKey(String);

impl EntryKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The leading `YYYY-MM-DD` portion of the key, if long enough.
    ///
    /// Day-granular keys are returned whole; timestamp keys such as
    /// `2024-01-01T12:00:00Z` are truncated to their date. A key whose
    /// tenth byte is not a character boundary cannot be a date and is
    /// returned whole for the date parse to reject.
    pub fn day_prefix(&self) -> &str {
        self.0.get(..10).unwrap_or(&self.0)
    }
}

impl fmt::Debug for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryKey({})", self.0)
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntryKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The authoritative content of an entry: composite items when present,
/// otherwise the scalar value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EntryPayload<'a> {
    Scalar(&'a Value),
    Items(&'a [Value]),
}

/// One timestamped reading within a bucket.
///
/// Exactly one of `value` (scalar reading) and `items` (ordered composite
/// sample) is authoritative; `items` wins when both are present. `hash` is
/// computed server-side over the authoritative payload and is immutable once
/// set — a resubmitted entry whose hash no longer matches its content is
/// stale or corrupt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueEntry {
    pub key: EntryKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<ContentHash>,
}

impl ValueEntry {
    /// A scalar entry with no hash stamped yet.
    pub fn scalar(key: impl Into<EntryKey>, value: Value) -> Self {
        Self {
            key: key.into(),
            value: Some(value),
            items: None,
            hash: None,
        }
    }

    /// A composite entry with no hash stamped yet.
    pub fn composite(key: impl Into<EntryKey>, items: Vec<Value>) -> Self {
        Self {
            key: key.into(),
            value: None,
            items: Some(items),
            hash: None,
        }
    }

    /// The authoritative payload: `items` if present, else `value`.
    pub fn payload(&self) -> Option<EntryPayload<'_>> {
        self.items
            .as_deref()
            .map(EntryPayload::Items)
            .or(self.value.as_ref().map(EntryPayload::Scalar))
    }
}

impl From<String> for EntryKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_order_chronologically() {
        let a = EntryKey::from("2023-12-31");
        let b = EntryKey::from("2024-01-01");
        assert!(a < b);
    }

    #[test]
    fn day_prefix_truncates_timestamps() {
        let key = EntryKey::from("2024-01-01T12:00:00Z");
        assert_eq!(key.day_prefix(), "2024-01-01");
        assert_eq!(EntryKey::from("2024-01-01").day_prefix(), "2024-01-01");
    }

    #[test]
    fn day_prefix_handles_multibyte_keys() {
        // Byte 10 falls inside the two-byte `é`; the key comes back whole
        // instead of panicking on a mid-character slice.
        let key = EntryKey::from("2024-01-0é1");
        assert_eq!(key.day_prefix(), "2024-01-0é1");
        assert_eq!(EntryKey::from("é").day_prefix(), "é");
    }

    #[test]
    fn items_take_precedence_over_value() {
        let entry = ValueEntry {
            key: EntryKey::from("2024-01-01"),
            value: Some(json!(1)),
            items: Some(vec![json!(2), json!(3)]),
            hash: None,
        };
        match entry.payload() {
            Some(EntryPayload::Items(items)) => assert_eq!(items.len(), 2),
            other => panic!("expected items payload, got {other:?}"),
        }
    }

    #[test]
    fn scalar_payload_when_no_items() {
        let entry = ValueEntry::scalar("2024-01-01", json!(42.5));
        assert_eq!(entry.payload(), Some(EntryPayload::Scalar(&json!(42.5))));
    }

    #[test]
    fn empty_entry_has_no_payload() {
        let entry = ValueEntry {
            key: EntryKey::from("2024-01-01"),
            value: None,
            items: None,
            hash: None,
        };
        assert!(entry.payload().is_none());
    }
}
