use serde_json::Value;
use taghist_types::{ContentHash, EntryPayload};

use crate::canonical::canonical_bytes;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag that is prepended to every computation,
/// so an entry payload and a bucket fingerprint with identical bytes can
/// never collide. All inputs pass through [`canonical_bytes`] first: object
/// key insertion order never changes a hash, array order always does.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for per-entry payloads (`items ?? value`).
    pub const ENTRY: Self = Self {
        domain: "taghist-entry-v1",
    };
    /// Hasher for bucket fingerprints (ordered per-entry hash lists).
    pub const BUCKET: Self = Self {
        domain: "taghist-bucket-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash_bytes(&self, data: &[u8]) -> ContentHash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        ContentHash::from_hash(*hasher.finalize().as_bytes())
    }

    /// Hash a single JSON value canonically.
    pub fn hash_value(&self, value: &Value) -> ContentHash {
        self.hash_bytes(&canonical_bytes(value))
    }

    /// Hash an ordered sequence of JSON values canonically.
    pub fn hash_items(&self, items: &[Value]) -> ContentHash {
        let mut buf = Vec::new();
        buf.push(b'[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                buf.push(b',');
            }
            buf.extend_from_slice(&canonical_bytes(item));
        }
        buf.push(b']');
        self.hash_bytes(&buf)
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

/// Content hash of one entry's authoritative payload.
pub fn entry_hash(payload: EntryPayload<'_>) -> ContentHash {
    match payload {
        EntryPayload::Scalar(value) => ContentHasher::ENTRY.hash_value(value),
        EntryPayload::Items(items) => ContentHasher::ENTRY.hash_items(items),
    }
}

/// Aggregate hash over an ordered list of per-entry hashes.
///
/// This is the bucket's content fingerprint: it changes whenever an entry is
/// added, superseded, or reordered.
pub fn aggregate_hash(hashes: &[ContentHash]) -> ContentHash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(ContentHasher::BUCKET.domain.as_bytes());
    hasher.update(b":");
    for hash in hashes {
        hasher.update(hash.as_bytes());
    }
    ContentHash::from_hash(*hasher.finalize().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn value_hash_is_deterministic() {
        let value = json!({ "temp": 21.5, "unit": "C" });
        assert_eq!(
            ContentHasher::ENTRY.hash_value(&value),
            ContentHasher::ENTRY.hash_value(&value)
        );
    }

    #[test]
    fn key_order_does_not_change_hash() {
        let a = json!({ "unit": "C", "temp": 21.5 });
        let b = json!({ "temp": 21.5, "unit": "C" });
        assert_eq!(
            ContentHasher::ENTRY.hash_value(&a),
            ContentHasher::ENTRY.hash_value(&b)
        );
    }

    #[test]
    fn item_order_changes_hash() {
        let a = vec![json!(1), json!(2)];
        let b = vec![json!(2), json!(1)];
        assert_ne!(
            ContentHasher::ENTRY.hash_items(&a),
            ContentHasher::ENTRY.hash_items(&b)
        );
    }

    #[test]
    fn different_domains_produce_different_hashes() {
        let value = json!("same content");
        assert_ne!(
            ContentHasher::ENTRY.hash_value(&value),
            ContentHasher::BUCKET.hash_value(&value)
        );
    }

    #[test]
    fn scalar_and_singleton_items_differ() {
        let value = json!(42);
        assert_ne!(
            entry_hash(EntryPayload::Scalar(&value)),
            entry_hash(EntryPayload::Items(std::slice::from_ref(&value)))
        );
    }

    #[test]
    fn aggregate_depends_on_order() {
        let h1 = ContentHash::from_hash([1u8; 32]);
        let h2 = ContentHash::from_hash([2u8; 32]);
        assert_ne!(aggregate_hash(&[h1, h2]), aggregate_hash(&[h2, h1]));
        assert_eq!(aggregate_hash(&[h1, h2]), aggregate_hash(&[h1, h2]));
    }

    #[test]
    fn aggregate_of_empty_list_is_stable() {
        assert_eq!(aggregate_hash(&[]), aggregate_hash(&[]));
    }
}
