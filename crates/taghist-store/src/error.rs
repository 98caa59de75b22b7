use taghist_types::DocumentId;

/// Errors from document store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The requested document was not found.
    #[error("document not found: {0}")]
    NotFound(DocumentId),

    /// A document with this identity already exists.
    #[error("document already exists: {0}")]
    AlreadyExists(DocumentId),

    /// Compare-and-swap refused: the persisted document's aggregate hash no
    /// longer matches what the writer observed. Expected and retryable.
    #[error("compare-and-swap failed for {id}: document changed since read")]
    CasFailed { id: DocumentId },

    /// The storage backend failed or timed out.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
