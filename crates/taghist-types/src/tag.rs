use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque stable identifier of a tag, assigned by the external registry.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(String);

impl TagId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TagId({})", self.0)
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TagId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Bucket-capacity configuration carried by an owner-group tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagStoreConfig {
    /// Number of entries one storage bucket holds for this tag's group.
    pub number_of_values_in_doc: u32,
}

/// A named process variable tracked by the acquisition system.
///
/// Tags are owned by the external registry and read-only to the
/// historization core. `browse_name` is the unique human-readable lookup
/// key; `owner_group` names the tag whose [`TagStoreConfig`] governs the
/// bucket capacity for this tag's group (a tag may be its own group owner).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: TagId,
    pub browse_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<TagStoreConfig>,
}

impl Tag {
    /// Bucket capacity if this tag carries the group configuration itself.
    pub fn bucket_capacity(&self) -> Option<u32> {
        self.store.as_ref().map(|s| s.number_of_values_in_doc)
    }
}
