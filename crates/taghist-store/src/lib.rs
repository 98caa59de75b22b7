//! Document persistence boundary for the tag historization store.
//!
//! The underlying persistence engine is external; the core only needs the
//! narrow [`DocumentStore`] surface: `get`, `find`, `create`, `patch`, and
//! an atomic `compare_and_swap` keyed on the persisted document's aggregate
//! hash. [`InMemoryDocumentStore`] implements it for tests and embedding.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryDocumentStore;
pub use traits::DocumentStore;
