use taghist_hash::{aggregate_hash, entry_hash};
use taghist_registry::TagRegistry;
use taghist_types::{ContentHash, StoreMeta, Tag, ValueDocument, WriteRequest};
use tracing::debug;

use crate::error::{HistorError, HistorResult};
use crate::period::assign_period;

/// Validates a candidate write and normalizes it into a persistable record.
///
/// This is the process-item stage of the pipeline: it rejects malformed
/// requests, resolves the tag identity through the registry, stamps every
/// entry with its content hash, verifies any hashes the caller supplied,
/// and assigns the record to its period bucket. Every failure is a hard
/// rejection of the whole write; nothing is ever partially applied.
pub struct RecordValidator<'a, R: TagRegistry> {
    registry: &'a R,
}

impl<'a, R: TagRegistry> RecordValidator<'a, R> {
    pub fn new(registry: &'a R) -> Self {
        Self { registry }
    }

    /// Validate `request` and produce the normalized, hash-stamped,
    /// period-stamped record.
    ///
    /// Field checks run before any hashing or registry access: a request
    /// without `tagName` or with empty `values` never reaches the registry.
    pub async fn validate(&self, request: WriteRequest) -> HistorResult<ValueDocument> {
        let tag_name = match request.tag_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                return Err(HistorError::Validation {
                    field: "tagName",
                    reason: "required".into(),
                })
            }
        };
        if request.values.is_empty() {
            return Err(HistorError::Validation {
                field: "values",
                reason: "at least one entry required".into(),
            });
        }

        // Whitelist copy: only the fields named here survive normalization.
        let WriteRequest {
            tag_id,
            values,
            store_start,
            store_end,
            store,
            ..
        } = request;

        let mut resolved_tag = None;
        let tag_id = match tag_id {
            Some(id) => id,
            None => {
                let tag = self
                    .registry
                    .find_by_name(&tag_name)
                    .await?
                    .ok_or_else(|| HistorError::TagNotFound(tag_name.clone()))?;
                let id = tag.id.clone();
                resolved_tag = Some(tag);
                id
            }
        };

        let mut record = ValueDocument {
            tag_id,
            tag_name,
            store_start,
            store_end,
            values,
            store,
        };

        if record.is_historized() {
            self.stamp_and_bucket(&mut record, resolved_tag).await?;
        }

        debug!(
            tag = %record.tag_name,
            entries = record.values.len(),
            historized = record.is_historized(),
            "record validated"
        );
        Ok(record)
    }

    /// Hash stamping and period assignment for a historization write.
    async fn stamp_and_bucket(
        &self,
        record: &mut ValueDocument,
        resolved_tag: Option<Tag>,
    ) -> HistorResult<()> {
        let mut entry_hashes = Vec::with_capacity(record.values.len());
        for entry in &mut record.values {
            let payload = entry.payload().ok_or_else(|| HistorError::Validation {
                field: "values",
                reason: format!("entry `{}` carries neither value nor items", entry.key),
            })?;
            let computed = entry_hash(payload);
            match entry.hash {
                Some(supplied) if supplied != computed => {
                    return Err(HistorError::EntryHashMismatch {
                        key: entry.key.clone(),
                    });
                }
                _ => entry.hash = Some(computed),
            }
            entry_hashes.push(computed);
        }

        let aggregate = aggregate_hash(&entry_hashes);
        if let Some(supplied) = record.store.as_ref().and_then(|s| s.hash) {
            if supplied != aggregate {
                return Err(HistorError::Conflict(format!(
                    "supplied store hash {} does not match recomputed aggregate {}",
                    supplied.short_hex(),
                    aggregate.short_hex()
                )));
            }
        }

        let has_period = record.store.as_ref().is_some_and(|s| s.period.is_some());
        if !has_period {
            let capacity = self.bucket_capacity(record, resolved_tag).await?;
            // Period assignment only ever uses the key that opens the
            // record's storeStart; later entries inherit the bucket.
            let start = record
                .store_start
                .as_ref()
                .cloned()
                .unwrap_or_else(|| record.values[0].key.clone());
            let period = assign_period(&start, capacity)?;
            match record.store.as_mut() {
                Some(meta) => meta.period = Some(period),
                None => {
                    record.store = Some(StoreMeta {
                        count: record.values.len() as u64,
                        period: Some(period),
                        hash: Some(aggregate),
                    });
                }
            }
        }

        // Every entry must belong to the bucket the record targets.
        if let Some(period) = record.store.as_ref().and_then(|s| s.period.as_ref()) {
            if let Some(stray) = record.values.iter().find(|e| !period.contains(&e.key)) {
                return Err(HistorError::Validation {
                    field: "values",
                    reason: format!(
                        "entry `{}` falls outside the bucket period {}..{}",
                        stray.key, period.start, period.end
                    ),
                });
            }
        }
        Ok(())
    }

    /// The bucket capacity configured on the record's owner-group tag.
    async fn bucket_capacity(
        &self,
        record: &ValueDocument,
        resolved_tag: Option<Tag>,
    ) -> HistorResult<u32> {
        let tag = match resolved_tag {
            Some(tag) => tag,
            None => self
                .registry
                .get(&record.tag_id)
                .await?
                .ok_or_else(|| HistorError::TagNotFound(record.tag_id.to_string()))?,
        };
        // A tag without an owner group owns its configuration itself.
        let owner = match tag.owner_group.as_deref() {
            Some(group) if group != tag.browse_name => self
                .registry
                .find_by_name(group)
                .await?
                .ok_or_else(|| HistorError::OwnerGroupNotFound(group.to_string()))?,
            _ => tag,
        };
        owner
            .bucket_capacity()
            .ok_or_else(|| HistorError::Validation {
                field: "numberOfValuesInDoc",
                reason: format!(
                    "owner group `{}` has no bucket capacity configured",
                    owner.browse_name
                ),
            })
    }
}

/// Convenience free function: validate one request against a registry.
pub async fn validate_request<R: TagRegistry>(
    registry: &R,
    request: WriteRequest,
) -> HistorResult<ValueDocument> {
    RecordValidator::new(registry).validate(request).await
}

/// Recompute the aggregate hash a record's stamped entries produce.
///
/// Fails if any entry is missing its hash stamp.
pub fn recompute_aggregate(record: &ValueDocument) -> Option<ContentHash> {
    record.entry_hashes().map(|hashes| aggregate_hash(&hashes))
}
