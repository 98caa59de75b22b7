use async_trait::async_trait;
use taghist_types::{ContentHash, DocumentId, TagId, ValueDocument};

use crate::error::StoreResult;

/// Persistence boundary for value documents.
///
/// All implementations must satisfy these invariants:
/// - Documents are addressed by their deterministic [`DocumentId`]; the
///   store never derives or rewrites identities itself.
/// - `compare_and_swap` is atomic with respect to other writes on the same
///   identity: the swap happens only if the persisted document's
///   `store.hash` still equals `expected`.
/// - The store never interprets entry payloads.
/// - All backend errors are propagated, never silently ignored.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read a document by identity.
    ///
    /// Returns `Ok(None)` if no document exists under `id`.
    async fn get(&self, id: &DocumentId) -> StoreResult<Option<ValueDocument>>;

    /// All documents persisted for one tag, in unspecified order.
    async fn find(&self, tag: &TagId) -> StoreResult<Vec<ValueDocument>>;

    /// Persist a new document. Fails with `AlreadyExists` if the identity
    /// is taken.
    async fn create(&self, id: &DocumentId, document: &ValueDocument) -> StoreResult<()>;

    /// Replace an existing document unconditionally. Fails with `NotFound`
    /// if the identity is unknown.
    async fn patch(&self, id: &DocumentId, document: &ValueDocument)
        -> StoreResult<ValueDocument>;

    /// Replace an existing document only if its persisted `store.hash`
    /// still equals `expected` (`None` meaning "no hash stamped yet").
    ///
    /// Fails with `CasFailed` when another writer got there first; the
    /// caller is expected to re-read and retry.
    async fn compare_and_swap(
        &self,
        id: &DocumentId,
        expected: Option<&ContentHash>,
        document: &ValueDocument,
    ) -> StoreResult<ValueDocument>;
}
