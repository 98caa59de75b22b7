//! Content hashing for the tag historization store.
//!
//! Implements the hash-verification contract the historization protocol
//! depends on: a deterministic, domain-separated BLAKE3 digest over a
//! canonical JSON serialization. Hashing happens at two levels — per entry
//! (`items ?? value`) and per bucket (the ordered list of entry hashes) —
//! and both must be stable across processes and object key insertion order.

pub mod canonical;
pub mod hasher;

pub use canonical::canonical_bytes;
pub use hasher::{aggregate_hash, entry_hash, ContentHasher};
