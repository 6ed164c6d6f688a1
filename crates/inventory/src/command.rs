//! Commands accepted by the [`InventoryStore`](crate::InventoryStore) and their
//! outcomes.
//!
//! Every timestamped command carries `occurred_at` so that the store itself
//! stays clock-free and deterministic under test.

use serde::{Deserialize, Serialize};

use labinv_core::{ItemId, StorageId, Timestamp};

use crate::item::{ItemPatch, NewItem};
use crate::storage::{NewStorage, StoragePatch};
use crate::taxonomy::TaxonomyKind;

/// Command: CreateStorage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateStorage {
    pub storage: NewStorage,
    pub occurred_at: Timestamp,
}

/// Command: UpdateStorage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStorage {
    pub storage_id: StorageId,
    pub patch: StoragePatch,
    pub occurred_at: Timestamp,
}

/// Command: DeleteStorage (cascades to the storage's items).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteStorage {
    pub storage_id: StorageId,
}

/// Command: AddItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItem {
    pub storage_id: StorageId,
    pub item: NewItem,
    pub occurred_at: Timestamp,
}

/// Command: UpdateItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateItem {
    pub storage_id: StorageId,
    pub item_id: ItemId,
    pub patch: ItemPatch,
    pub occurred_at: Timestamp,
}

/// Command: DeleteItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteItem {
    pub storage_id: StorageId,
    pub item_id: ItemId,
    pub occurred_at: Timestamp,
}

/// Command: AddTaxonomyValue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTaxonomyValue {
    pub kind: TaxonomyKind,
    pub value: String,
}

/// Command: RemoveTaxonomyValue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveTaxonomyValue {
    pub kind: TaxonomyKind,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryCommand {
    CreateStorage(CreateStorage),
    UpdateStorage(UpdateStorage),
    DeleteStorage(DeleteStorage),
    AddItem(AddItem),
    UpdateItem(UpdateItem),
    DeleteItem(DeleteItem),
    AddTaxonomyValue(AddTaxonomyValue),
    RemoveTaxonomyValue(RemoveTaxonomyValue),
}

impl InventoryCommand {
    pub fn command_type(&self) -> &'static str {
        match self {
            InventoryCommand::CreateStorage(_) => "inventory.storage.create",
            InventoryCommand::UpdateStorage(_) => "inventory.storage.update",
            InventoryCommand::DeleteStorage(_) => "inventory.storage.delete",
            InventoryCommand::AddItem(_) => "inventory.item.add",
            InventoryCommand::UpdateItem(_) => "inventory.item.update",
            InventoryCommand::DeleteItem(_) => "inventory.item.delete",
            InventoryCommand::AddTaxonomyValue(_) => "inventory.taxonomy.add",
            InventoryCommand::RemoveTaxonomyValue(_) => "inventory.taxonomy.remove",
        }
    }
}

/// Result of a successfully handled command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandOutcome {
    StorageCreated(StorageId),
    StorageUpdated(StorageId),
    StorageDeleted {
        storage_id: StorageId,
        removed_items: usize,
    },
    ItemAdded {
        storage_id: StorageId,
        item_id: ItemId,
    },
    ItemUpdated {
        storage_id: StorageId,
        item_id: ItemId,
    },
    ItemDeleted {
        storage_id: StorageId,
        item_id: ItemId,
    },
    TaxonomyChanged {
        kind: TaxonomyKind,
        changed: bool,
    },
}

impl CommandOutcome {
    /// Storage whose record was created, changed or removed, if any.
    pub fn storage_id(&self) -> Option<&StorageId> {
        match self {
            CommandOutcome::StorageCreated(id) | CommandOutcome::StorageUpdated(id) => Some(id),
            CommandOutcome::StorageDeleted { storage_id, .. }
            | CommandOutcome::ItemAdded { storage_id, .. }
            | CommandOutcome::ItemUpdated { storage_id, .. }
            | CommandOutcome::ItemDeleted { storage_id, .. } => Some(storage_id),
            CommandOutcome::TaxonomyChanged { .. } => None,
        }
    }

    /// False when the command left the state as it was (e.g. adding a label
    /// that already exists).
    pub fn changed_state(&self) -> bool {
        !matches!(self, CommandOutcome::TaxonomyChanged { changed: false, .. })
    }
}
