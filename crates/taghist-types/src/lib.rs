//! Foundation types for the tag historization store.
//!
//! This crate provides the data model shared by every other `taghist` crate:
//! tag identities and registry metadata, timestamped value entries, period
//! buckets, and the persisted document shape.
//!
//! # Key Types
//!
//! - [`Tag`] — Process-variable metadata owned by the external registry
//! - [`ContentHash`] — BLAKE3 content fingerprint of an entry or bucket
//! - [`ValueEntry`] — One timestamped reading (scalar or composite)
//! - [`ValueDocument`] — One period bucket of entries, the persisted unit
//! - [`WriteRequest`] — A candidate write before validation

pub mod document;
pub mod entry;
pub mod error;
pub mod hash;
pub mod request;
pub mod tag;

pub use document::{DocumentId, Period, StoreMeta, ValueDocument};
pub use entry::{EntryKey, EntryPayload, ValueEntry};
pub use error::TypeError;
pub use hash::ContentHash;
pub use request::WriteRequest;
pub use tag::{Tag, TagId, TagStoreConfig};
