//! `labinv-core`: domain building blocks.
//!
//! This crate contains **pure domain** primitives (no IO): the error model,
//! identifiers, and the wall-clock stamps used by the inventory records.

pub mod entity;
pub mod error;
pub mod id;
pub mod timestamp;
pub mod value_object;

pub use entity::{Entity, find_by_id, find_by_id_mut, position_by_id};
pub use error::{DomainError, DomainResult, require_non_blank};
pub use id::{ItemId, StorageId};
pub use timestamp::{DateStamp, Timestamp};
pub use value_object::ValueObject;
