use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use taghist_types::{Tag, TagId};

use crate::error::RegistryResult;
use crate::traits::TagRegistry;

/// In-memory, HashMap-based tag registry.
///
/// Intended for tests and embedding. Tags are held behind a `RwLock` and
/// cloned on read.
pub struct InMemoryTagRegistry {
    tags: RwLock<HashMap<TagId, Tag>>,
}

impl InMemoryTagRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tags: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry pre-populated with the given tags.
    pub fn with_tags(tags: impl IntoIterator<Item = Tag>) -> Self {
        let registry = Self::new();
        for tag in tags {
            registry.insert(tag);
        }
        registry
    }

    /// Insert or replace a tag by id.
    pub fn insert(&self, tag: Tag) {
        self.tags
            .write()
            .expect("lock poisoned")
            .insert(tag.id.clone(), tag);
    }

    /// Number of tags currently registered.
    pub fn len(&self) -> usize {
        self.tags.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tags.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryTagRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TagRegistry for InMemoryTagRegistry {
    async fn find_by_name(&self, browse_name: &str) -> RegistryResult<Option<Tag>> {
        let map = self.tags.read().expect("lock poisoned");
        Ok(map.values().find(|t| t.browse_name == browse_name).cloned())
    }

    async fn get(&self, id: &TagId) -> RegistryResult<Option<Tag>> {
        let map = self.tags.read().expect("lock poisoned");
        Ok(map.get(id).cloned())
    }
}

impl std::fmt::Debug for InMemoryTagRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTagRegistry")
            .field("tag_count", &self.len())
            .finish()
    }
}
