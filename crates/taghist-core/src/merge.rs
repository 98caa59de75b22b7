use std::collections::HashSet;

use taghist_hash::aggregate_hash;
use taghist_types::{ContentHash, EntryKey, StoreMeta, ValueDocument};
use tracing::debug;

use crate::error::{HistorError, HistorResult};
use crate::validator::recompute_aggregate;

/// Merge a validated incremental record into the persisted document for the
/// same bucket.
///
/// This is the store-items stage: it runs on updates only (the persisted
/// document already exists) and always executes the full evict/sort path,
/// singleton records included. Persisted entries whose key reappears in the
/// incoming `values` are superseded; everything else survives. Boundaries
/// are recomputed from an ascending sort, the stored order is descending by
/// key, and the bucket metadata (count, aggregate hash) is recomputed over
/// the merged order.
///
/// Before anything is merged the persisted document is held to its own hash
/// stamps: a stored aggregate that no longer matches its entries is an
/// integrity error, and a caller-supplied `expected_store_hash` that does
/// not match the recomputed aggregate is a conflict (the bucket moved since
/// the caller read it).
pub fn merge_into_persisted(
    record: &mut ValueDocument,
    persisted: &ValueDocument,
    expected_store_hash: Option<&ContentHash>,
) -> HistorResult<()> {
    let current = verify_persisted(persisted)?;
    if let Some(expected) = expected_store_hash {
        if Some(*expected) != current {
            return Err(HistorError::Conflict(format!(
                "bucket `{}` changed since read",
                persisted.id()
            )));
        }
    }

    let incoming_keys: HashSet<&EntryKey> = record.values.iter().map(|e| &e.key).collect();
    let superseded = persisted
        .values
        .iter()
        .filter(|e| incoming_keys.contains(&e.key))
        .count();

    let mut merged: Vec<_> = persisted
        .values
        .iter()
        .filter(|e| !incoming_keys.contains(&e.key))
        .cloned()
        .collect();
    merged.append(&mut record.values);

    // Ascending pass recomputes the boundaries; the stored order is
    // descending by key.
    merged.sort_by(|a, b| a.key.cmp(&b.key));
    record.store_start = merged.first().map(|e| e.key.clone());
    record.store_end = merged.last().map(|e| e.key.clone());
    merged.sort_by(|a, b| b.key.cmp(&a.key));

    let hashes: Vec<ContentHash> = merged
        .iter()
        .map(|e| {
            e.hash.ok_or_else(|| HistorError::Integrity {
                id: persisted.id(),
                reason: format!("merged entry `{}` is missing its hash stamp", e.key),
            })
        })
        .collect::<HistorResult<_>>()?;
    let aggregate = aggregate_hash(&hashes);

    let period = record
        .store
        .as_ref()
        .and_then(|s| s.period.clone())
        .or_else(|| persisted.store.as_ref().and_then(|s| s.period.clone()));
    record.store = Some(StoreMeta {
        count: merged.len() as u64,
        period,
        hash: Some(aggregate),
    });
    record.values = merged;

    debug!(
        id = %persisted.id(),
        merged = record.values.len(),
        superseded,
        "bucket merged"
    );
    Ok(())
}

/// Recompute the persisted document's aggregate hash and hold it to its own
/// stamp. Returns the recomputed aggregate (`None` when the document has no
/// entries with hashes and no stamp, i.e. nothing to claim against).
fn verify_persisted(persisted: &ValueDocument) -> HistorResult<Option<ContentHash>> {
    let recomputed = recompute_aggregate(persisted).ok_or_else(|| HistorError::Integrity {
        id: persisted.id(),
        reason: "persisted entry is missing its hash stamp".into(),
    })?;
    if let Some(stored) = persisted.store.as_ref().and_then(|s| s.hash) {
        if stored != recomputed {
            return Err(HistorError::Integrity {
                id: persisted.id(),
                reason: format!(
                    "stored aggregate {} does not match entries ({})",
                    stored.short_hex(),
                    recomputed.short_hex()
                ),
            });
        }
    }
    Ok(Some(recomputed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use taghist_hash::entry_hash;
    use taghist_types::{Period, TagId, ValueEntry};

    fn stamped(key: &str, value: serde_json::Value) -> ValueEntry {
        let mut entry = ValueEntry::scalar(key, value);
        entry.hash = Some(entry_hash(entry.payload().unwrap()));
        entry
    }

    fn persisted_doc(entries: Vec<ValueEntry>) -> ValueDocument {
        let hashes: Vec<ContentHash> = entries.iter().filter_map(|e| e.hash).collect();
        let start = entries.iter().map(|e| e.key.clone()).min();
        let end = entries.iter().map(|e| e.key.clone()).max();
        ValueDocument {
            tag_id: TagId::from("t-temp"),
            tag_name: "plant.line1.temp".into(),
            store_start: start,
            store_end: end,
            values: entries,
            store: Some(StoreMeta {
                count: hashes.len() as u64,
                period: Some(Period::new("2023-12-09", "2024-03-17")),
                hash: Some(aggregate_hash(&hashes)),
            }),
        }
    }

    fn incoming(entries: Vec<ValueEntry>) -> ValueDocument {
        let start = entries.iter().map(|e| e.key.clone()).min();
        ValueDocument {
            tag_id: TagId::from("t-temp"),
            tag_name: "plant.line1.temp".into(),
            store_start: start.clone(),
            store_end: start,
            values: entries,
            store: None,
        }
    }

    #[test]
    fn superseding_merge_evicts_the_shared_key() {
        let persisted = persisted_doc(vec![
            stamped("2024-01-01", json!(0)),
            stamped("2023-12-31", json!(9)),
        ]);
        let mut record = incoming(vec![stamped("2024-01-01", json!(1))]);
        merge_into_persisted(&mut record, &persisted, None).unwrap();

        assert_eq!(record.values.len(), 2);
        assert_eq!(record.values[0].key, EntryKey::from("2024-01-01"));
        assert_eq!(record.values[0].value, Some(json!(1)));
        assert_eq!(record.values[1].key, EntryKey::from("2023-12-31"));
        assert_eq!(record.store_start, Some(EntryKey::from("2023-12-31")));
        assert_eq!(record.store_end, Some(EntryKey::from("2024-01-01")));
    }

    #[test]
    fn disjoint_keys_degenerate_to_pure_append() {
        let persisted = persisted_doc(vec![stamped("2024-01-01", json!(1))]);
        let mut record = incoming(vec![stamped("2024-01-02", json!(2))]);
        merge_into_persisted(&mut record, &persisted, None).unwrap();

        assert_eq!(record.values.len(), 2);
        // Descending stored order: newest first.
        assert_eq!(record.values[0].key, EntryKey::from("2024-01-02"));
        assert_eq!(record.values[1].key, EntryKey::from("2024-01-01"));
        assert_eq!(record.store_start, Some(EntryKey::from("2024-01-01")));
        assert_eq!(record.store_end, Some(EntryKey::from("2024-01-02")));
    }

    #[test]
    fn metadata_is_recomputed_over_the_merged_order() {
        let persisted = persisted_doc(vec![stamped("2024-01-01", json!(1))]);
        let mut record = incoming(vec![stamped("2024-01-02", json!(2))]);
        merge_into_persisted(&mut record, &persisted, None).unwrap();

        let meta = record.store.expect("store recomputed");
        assert_eq!(meta.count, 2);
        assert_eq!(meta.period, Some(Period::new("2023-12-09", "2024-03-17")));
        let expected = aggregate_hash(
            &record
                .values
                .iter()
                .map(|e| e.hash.unwrap())
                .collect::<Vec<_>>(),
        );
        assert_eq!(meta.hash, Some(expected));
    }

    #[test]
    fn matching_expected_hash_is_accepted() {
        let persisted = persisted_doc(vec![stamped("2024-01-01", json!(1))]);
        let current = persisted.store.as_ref().unwrap().hash.unwrap();
        let mut record = incoming(vec![stamped("2024-01-02", json!(2))]);
        merge_into_persisted(&mut record, &persisted, Some(&current)).unwrap();
    }

    #[test]
    fn stale_expected_hash_is_a_conflict() {
        let persisted = persisted_doc(vec![stamped("2024-01-01", json!(1))]);
        let stale = ContentHash::from_hash([0xaa; 32]);
        let mut record = incoming(vec![stamped("2024-01-02", json!(2))]);
        let err = merge_into_persisted(&mut record, &persisted, Some(&stale)).unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(err, HistorError::Conflict(_)));
    }

    #[test]
    fn damaged_persisted_stamp_is_an_integrity_error() {
        let mut persisted = persisted_doc(vec![stamped("2024-01-01", json!(1))]);
        persisted.store.as_mut().unwrap().hash = Some(ContentHash::from_hash([0xbb; 32]));
        let mut record = incoming(vec![stamped("2024-01-02", json!(2))]);
        let err = merge_into_persisted(&mut record, &persisted, None).unwrap_err();
        assert!(!err.is_retryable());
        assert!(matches!(err, HistorError::Integrity { .. }));
    }

    #[test]
    fn unstamped_persisted_entry_is_an_integrity_error() {
        let mut persisted = persisted_doc(vec![stamped("2024-01-01", json!(1))]);
        persisted.values[0].hash = None;
        persisted.store.as_mut().unwrap().hash = None;
        let mut record = incoming(vec![stamped("2024-01-02", json!(2))]);
        let err = merge_into_persisted(&mut record, &persisted, None).unwrap_err();
        assert!(matches!(err, HistorError::Integrity { .. }));
    }

    #[test]
    fn singleton_update_runs_the_full_merge_path() {
        let persisted = persisted_doc(vec![stamped("2024-01-01", json!(0))]);
        let mut record = incoming(vec![stamped("2024-01-01", json!(1))]);
        merge_into_persisted(&mut record, &persisted, None).unwrap();
        assert_eq!(record.values.len(), 1);
        assert_eq!(record.values[0].value, Some(json!(1)));
        assert_eq!(record.store.unwrap().count, 1);
    }

    #[test]
    fn multi_entry_incoming_supersedes_every_shared_key() {
        let persisted = persisted_doc(vec![
            stamped("2024-01-03", json!(30)),
            stamped("2024-01-02", json!(20)),
            stamped("2024-01-01", json!(10)),
        ]);
        let mut record = incoming(vec![
            stamped("2024-01-02", json!(21)),
            stamped("2024-01-04", json!(40)),
        ]);
        merge_into_persisted(&mut record, &persisted, None).unwrap();

        let keys: Vec<&str> = record.values.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["2024-01-04", "2024-01-03", "2024-01-02", "2024-01-01"]
        );
        assert_eq!(record.values[2].value, Some(json!(21)));
        assert_eq!(record.store_start, Some(EntryKey::from("2024-01-01")));
        assert_eq!(record.store_end, Some(EntryKey::from("2024-01-04")));
    }
}
