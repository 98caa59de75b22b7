//! Read-only tag registry boundary for the tag historization store.
//!
//! The registry owns tag metadata (identity, browse name, owner group, and
//! the owner group's bucket-capacity configuration). The historization core
//! only ever reads from it, through the [`TagRegistry`] trait, so unit tests
//! can run against [`InMemoryTagRegistry`] instead of the real service.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{RegistryError, RegistryResult};
pub use memory::InMemoryTagRegistry;
pub use traits::TagRegistry;
