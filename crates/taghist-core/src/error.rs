use taghist_registry::RegistryError;
use taghist_store::StoreError;
use taghist_types::{DocumentId, EntryKey};

/// Errors produced by the historization core.
///
/// Every variant is terminal for the current write attempt: the core never
/// partially applies a write and never retries internally. [`Conflict`] is
/// the designed concurrency-safety mechanism — callers must treat it as a
/// retryable condition (re-read the bucket and reapply), not a fatal bug.
///
/// [`Conflict`]: HistorError::Conflict
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HistorError {
    /// A required field is missing or malformed.
    #[error("validation failed for `{field}`: {reason}")]
    Validation { field: &'static str, reason: String },

    /// No tag with the given browse name or id exists in the registry.
    #[error("tag not found: {0}")]
    TagNotFound(String),

    /// The tag's owner-group tag could not be resolved by browse name.
    #[error("owner group tag not found: {0}")]
    OwnerGroupNotFound(String),

    /// A supplied per-entry hash does not match the recomputed content
    /// hash. The caller's copy of the entry is stale or corrupt.
    #[error("hash mismatch for entry `{key}`: supplied hash does not match content")]
    EntryHashMismatch { key: EntryKey },

    /// A supplied aggregate hash does not match the server-recomputed
    /// value. Expected and retryable: re-read the bucket and reapply.
    #[error("bucket hash conflict: {0}")]
    Conflict(String),

    /// The persisted document contradicts its own hash stamps. Unlike a
    /// conflict this is not retryable; the stored data is damaged.
    #[error("persisted document `{id}` is inconsistent: {reason}")]
    Integrity { id: DocumentId, reason: String },

    /// Tag registry failure.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Document store failure.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl HistorError {
    /// Whether the caller should re-read and retry the write.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<StoreError> for HistorError {
    fn from(err: StoreError) -> Self {
        match err {
            // CAS refusal is the storage-level face of a write conflict.
            StoreError::CasFailed { id } => {
                Self::Conflict(format!("document `{id}` changed since read"))
            }
            other => Self::Store(other),
        }
    }
}

/// Result alias for historization operations.
pub type HistorResult<T> = Result<T, HistorError>;
