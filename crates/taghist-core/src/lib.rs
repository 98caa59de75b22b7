//! Historization core of the tag-value store.
//!
//! Periodic readings of named process variables arrive as [`WriteRequest`]s
//! from external source adapters. The core validates and normalizes each
//! request, stamps every entry with its content hash, assigns the record to
//! a deterministic period bucket, and merges it into the persisted document
//! for that bucket — append-only, ordered by key, and hash-verified end to
//! end.
//!
//! # Pipeline
//!
//! 1. [`RecordValidator`] — field validation, tag resolution, hash
//!    stamping/verification, period assignment (process-item).
//! 2. [`merge_into_persisted`] — merge-by-key into the persisted bucket and
//!    boundary recomputation (store-items).
//! 3. [`Historian`] — composition under per-bucket write serialization and
//!    compare-and-swap persistence.
//!
//! Hash conflicts are the designed concurrency mechanism, not bugs: a
//! writer whose claimed bucket state no longer matches reality gets a
//! retryable [`HistorError::Conflict`] and is expected to re-read and
//! reapply.
//!
//! [`WriteRequest`]: taghist_types::WriteRequest

pub mod error;
pub mod historian;
pub mod merge;
pub mod period;
pub mod validator;

pub use error::{HistorError, HistorResult};
pub use historian::Historian;
pub use merge::merge_into_persisted;
pub use period::assign_period;
pub use validator::{recompute_aggregate, validate_request, RecordValidator};
