//! Whole-document persistence of the inventory.
//!
//! The gateway never does partial writes: every save replaces the complete
//! snapshot, every load reads it back in full.

pub mod in_memory;
pub mod json_file;
pub mod r#trait;

pub use in_memory::InMemoryGateway;
pub use json_file::JsonFileGateway;
pub use r#trait::{
    PersistenceError, PersistenceGateway, Snapshot, SnapshotSource, load_or_seed,
};
