use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use taghist_registry::TagRegistry;
use taghist_store::DocumentStore;
use taghist_types::{DocumentId, ValueDocument, WriteRequest};
use tracing::{debug, info};

use crate::error::{HistorError, HistorResult};
use crate::merge::merge_into_persisted;
use crate::validator::RecordValidator;

/// Per-bucket write locks.
///
/// The merge is a load-then-mutate-then-save sequence; without external
/// serialization two writers extending the same bucket can lose an update
/// between the load and the save. Every write therefore holds the async
/// mutex of its target document for the whole sequence. Lock handles are
/// created on first use and shared by identity.
struct BucketLocks {
    inner: Mutex<HashMap<DocumentId, Arc<tokio::sync::Mutex<()>>>>,
}

impl BucketLocks {
    fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, id: &DocumentId) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().expect("lock poisoned");
        // A lock whose only holder is this map belongs to a finished write;
        // drop it so closed buckets don't accumulate entries forever.
        map.retain(|_, lock| Arc::strong_count(lock) > 1);
        map.entry(id.clone()).or_default().clone()
    }
}

/// The historization pipeline: validate, bucket, merge, persist.
///
/// One `Historian` serializes writes per tag+period through [`BucketLocks`]
/// and additionally persists merges through the store's compare-and-swap,
/// so a racing writer that slipped past a stale read still fails with a
/// retryable conflict instead of silently losing entries.
pub struct Historian<R, S> {
    registry: Arc<R>,
    store: Arc<S>,
    locks: BucketLocks,
}

impl<R: TagRegistry, S: DocumentStore> Historian<R, S> {
    pub fn new(registry: Arc<R>, store: Arc<S>) -> Self {
        Self {
            registry,
            store,
            locks: BucketLocks::new(),
        }
    }

    /// Apply one write end to end and return the persisted document.
    ///
    /// The first write for a tag+period creates the bucket; later writes
    /// merge into it. Failures are terminal for this attempt and
    /// [`HistorError::is_retryable`] tells the caller whether re-reading
    /// and reapplying makes sense.
    pub async fn write(&self, request: WriteRequest) -> HistorResult<ValueDocument> {
        let expected_store_hash = request.expected_store_hash;
        let mut record = RecordValidator::new(self.registry.as_ref())
            .validate(request)
            .await?;
        let id = record.id();

        let bucket_lock = self.locks.lock_for(&id);
        let _guard = bucket_lock.lock().await;

        match self.store.get(&id).await? {
            None => {
                if let Some(expected) = expected_store_hash {
                    return Err(HistorError::Conflict(format!(
                        "write claims prior state {} but bucket `{id}` does not exist",
                        expected.short_hex()
                    )));
                }
                self.store.create(&id, &record).await?;
                info!(id = %id, entries = record.values.len(), "bucket opened");
                Ok(record)
            }
            Some(persisted) if record.is_historized() => {
                let cas_expected = persisted.store.as_ref().and_then(|s| s.hash);
                merge_into_persisted(&mut record, &persisted, expected_store_hash.as_ref())?;
                let saved = self
                    .store
                    .compare_and_swap(&id, cas_expected.as_ref(), &record)
                    .await?;
                debug!(id = %id, entries = saved.values.len(), "bucket extended");
                Ok(saved)
            }
            Some(_) => {
                // Current-value slot: the new reading fully replaces the old.
                let saved = self.store.patch(&id, &record).await?;
                debug!(id = %id, "current value replaced");
                Ok(saved)
            }
        }
    }

    /// Read one persisted document by identity.
    pub async fn get(&self, id: &DocumentId) -> HistorResult<Option<ValueDocument>> {
        Ok(self.store.get(id).await?)
    }
}
