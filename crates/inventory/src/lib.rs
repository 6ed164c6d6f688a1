//! Inventory domain module.
//!
//! Storage units holding items, the taxonomy sets that label them, and the
//! [`InventoryStore`] that applies CRUD commands to a [`StoreState`].
//! Implemented purely as deterministic domain logic (no IO, no clock reads).

pub mod command;
pub mod item;
pub mod link;
pub mod query;
pub mod state;
pub mod storage;
pub mod store;
pub mod taxonomy;

pub use command::{
    AddItem, AddTaxonomyValue, CommandOutcome, CreateStorage, DeleteItem, DeleteStorage,
    InventoryCommand, RemoveTaxonomyValue, UpdateItem, UpdateStorage,
};
pub use item::{Item, ItemPatch, NewItem};
pub use link::{CodeRenderer, RenderError, RenderedCode, storage_from_link, storage_link};
pub use query::{InventorySummary, ItemFilter, ItemRow, list_items};
pub use state::StoreState;
pub use storage::{NewStorage, Storage, StoragePatch};
pub use store::InventoryStore;
pub use taxonomy::{AVAILABLE_STATUS, DEFAULT_CATEGORY, Taxonomies, Taxonomy, TaxonomyKind};
