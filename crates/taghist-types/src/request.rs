use serde::{Deserialize, Serialize};

use crate::document::StoreMeta;
use crate::entry::{EntryKey, ValueEntry};
use crate::hash::ContentHash;
use crate::tag::TagId;

/// A candidate write before validation.
///
/// This is the raw shape handed over by a source adapter. Only the fields
/// named here survive normalization; anything else a caller sends is dropped
/// during deserialization, so unexpected fields can never reach the
/// persisted document.
///
/// A request with `store_start` set participates in historization; without
/// it the write only replaces the tag's current value. `expected_store_hash`
/// is the optimistic-concurrency token: the persisted document's aggregate
/// hash as last observed by the caller, verified before and during the
/// merge.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_id: Option<TagId>,
    #[serde(default)]
    pub values: Vec<ValueEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_start: Option<EntryKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_end: Option<EntryKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_store_hash: Option<ContentHash>,
}

impl WriteRequest {
    /// Whether this request participates in historization.
    pub fn is_historization(&self) -> bool {
        self.store_start.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_fields_are_dropped() {
        let request: WriteRequest = serde_json::from_value(json!({
            "tagName": "plant.line1.temp",
            "values": [{ "key": "2024-01-01", "value": 21.5 }],
            "storeStart": "2024-01-01",
            "injected": { "role": "admin" }
        }))
        .unwrap();
        assert_eq!(request.tag_name.as_deref(), Some("plant.line1.temp"));
        assert_eq!(request.values.len(), 1);
        assert!(request.is_historization());
        // Round-tripping produces only the whitelisted fields.
        let back = serde_json::to_value(&request).unwrap();
        assert!(back.get("injected").is_none());
    }

    #[test]
    fn missing_values_defaults_to_empty() {
        let request: WriteRequest =
            serde_json::from_value(json!({ "tagName": "plant.line1.temp" })).unwrap();
        assert!(request.values.is_empty());
        assert!(!request.is_historization());
    }
}
