//! casework-storage: the persistence adapter boundary.
//!
//! The schema/review engine assumes containers and versions, once saved,
//! come back byte-identical, and that concurrent transitions on one
//! record are serialized by an optimistic compare-and-swap on its
//! revision counter. This crate defines that contract; backends (a
//! document store, SQL, an in-process map) implement it.

mod error;
mod memory;
mod row;
mod traits;

pub use error::StorageError;
pub use memory::MemoryStorage;
pub use row::{ContainerRow, RecordRow, VersionRow};
pub use traits::CaseworkStorage;
