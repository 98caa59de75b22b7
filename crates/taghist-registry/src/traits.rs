use async_trait::async_trait;
use taghist_types::{Tag, TagId};

use crate::error::RegistryResult;

/// Read-only view of the external tag registry.
///
/// All implementations must satisfy these invariants:
/// - `browse_name` is unique across the registry; `find_by_name` returns at
///   most one tag. Uniqueness is a registry invariant, not enforced here.
/// - Lookups never mutate registry state.
/// - `Ok(None)` means "no such tag"; `Err` is reserved for backend failures.
#[async_trait]
pub trait TagRegistry: Send + Sync {
    /// Resolve a tag by its unique browse name.
    async fn find_by_name(&self, browse_name: &str) -> RegistryResult<Option<Tag>>;

    /// Resolve a tag by its stable identifier.
    async fn get(&self, id: &TagId) -> RegistryResult<Option<Tag>>;
}
