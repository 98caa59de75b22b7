use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use taghist_types::{ContentHash, DocumentId, TagId, ValueDocument};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::DocumentStore;

/// In-memory, HashMap-based document store.
///
/// Intended for tests and embedding. Documents are held behind a `RwLock`
/// and cloned on read; `compare_and_swap` is atomic because the write lock
/// covers the hash comparison and the swap.
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<DocumentId, ValueDocument>>,
}

impl InMemoryDocumentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
        }
    }

    /// Number of documents currently stored.
    pub fn len(&self) -> usize {
        self.documents.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.read().expect("lock poisoned").is_empty()
    }

    /// Remove all documents.
    pub fn clear(&self) {
        self.documents.write().expect("lock poisoned").clear();
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, id: &DocumentId) -> StoreResult<Option<ValueDocument>> {
        let map = self.documents.read().expect("lock poisoned");
        Ok(map.get(id).cloned())
    }

    async fn find(&self, tag: &TagId) -> StoreResult<Vec<ValueDocument>> {
        let map = self.documents.read().expect("lock poisoned");
        Ok(map.values().filter(|d| &d.tag_id == tag).cloned().collect())
    }

    async fn create(&self, id: &DocumentId, document: &ValueDocument) -> StoreResult<()> {
        let mut map = self.documents.write().expect("lock poisoned");
        if map.contains_key(id) {
            return Err(StoreError::AlreadyExists(id.clone()));
        }
        map.insert(id.clone(), document.clone());
        Ok(())
    }

    async fn patch(
        &self,
        id: &DocumentId,
        document: &ValueDocument,
    ) -> StoreResult<ValueDocument> {
        let mut map = self.documents.write().expect("lock poisoned");
        if !map.contains_key(id) {
            return Err(StoreError::NotFound(id.clone()));
        }
        map.insert(id.clone(), document.clone());
        Ok(document.clone())
    }

    async fn compare_and_swap(
        &self,
        id: &DocumentId,
        expected: Option<&ContentHash>,
        document: &ValueDocument,
    ) -> StoreResult<ValueDocument> {
        let mut map = self.documents.write().expect("lock poisoned");
        let current = map.get(id).ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let current_hash = current.store.as_ref().and_then(|s| s.hash.as_ref());
        if current_hash != expected {
            debug!(id = %id, "compare-and-swap refused; document moved");
            return Err(StoreError::CasFailed { id: id.clone() });
        }
        map.insert(id.clone(), document.clone());
        Ok(document.clone())
    }
}

impl std::fmt::Debug for InMemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDocumentStore")
            .field("document_count", &self.len())
            .finish()
    }
}
