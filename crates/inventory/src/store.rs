//! The authoritative in-memory inventory.

use labinv_core::{DomainError, DomainResult, ItemId, StorageId, require_non_blank};

use crate::command::{
    AddItem, AddTaxonomyValue, CommandOutcome, CreateStorage, DeleteItem, DeleteStorage,
    InventoryCommand, RemoveTaxonomyValue, UpdateItem, UpdateStorage,
};
use crate::item::Item;
use crate::state::StoreState;
use crate::storage::Storage;
use crate::taxonomy::{Taxonomies, TaxonomyKind};

/// Upper bound on random draws before giving up on a fresh storage id.
pub const MAX_ID_ATTEMPTS: usize = 16;

/// Owns a [`StoreState`] and applies CRUD operations to it.
///
/// Every operation validates its input before mutating anything, so a failed
/// call leaves the state exactly as it was. Persisting is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InventoryStore {
    state: StoreState,
}

impl InventoryStore {
    pub fn new(state: StoreState) -> Self {
        Self { state }
    }

    /// Store with no storages and the given taxonomy sets.
    pub fn empty(taxonomies: Taxonomies) -> Self {
        Self::new(StoreState::new(taxonomies))
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn into_state(self) -> StoreState {
        self.state
    }

    pub fn taxonomies(&self) -> &Taxonomies {
        self.state.taxonomies()
    }

    /// Storages in creation order.
    pub fn storages(&self) -> impl ExactSizeIterator<Item = &Storage> {
        self.state.storages()
    }

    pub fn storage(&self, storage_id: &StorageId) -> DomainResult<&Storage> {
        self.state
            .storage(storage_id)
            .ok_or_else(|| DomainError::not_found(format!("storage {storage_id}")))
    }

    pub fn item(&self, storage_id: &StorageId, item_id: ItemId) -> DomainResult<&Item> {
        self.storage(storage_id)?
            .item(item_id)
            .ok_or_else(|| DomainError::not_found(format!("item {item_id} in storage {storage_id}")))
    }

    /// Resolve a position (as shown in a listing) into the item's stable id.
    ///
    /// Resolve right before use: positions shift when an earlier item is
    /// deleted, ids never do.
    pub fn item_id_at(&self, storage_id: &StorageId, position: usize) -> DomainResult<ItemId> {
        let storage = self.storage(storage_id)?;
        storage
            .items()
            .get(position)
            .map(Item::item_id)
            .ok_or_else(|| {
                DomainError::not_found(format!(
                    "item at position {position} in storage {storage_id} ({} items)",
                    storage.items().len()
                ))
            })
    }

    /// Dispatch a command to the matching operation.
    pub fn handle(&mut self, command: InventoryCommand) -> DomainResult<CommandOutcome> {
        match command {
            InventoryCommand::CreateStorage(cmd) => {
                self.create_storage(cmd).map(CommandOutcome::StorageCreated)
            }
            InventoryCommand::UpdateStorage(cmd) => {
                let storage_id = cmd.storage_id.clone();
                self.update_storage(cmd)?;
                Ok(CommandOutcome::StorageUpdated(storage_id))
            }
            InventoryCommand::DeleteStorage(cmd) => {
                let storage_id = cmd.storage_id.clone();
                let removed = self.delete_storage(cmd)?;
                Ok(CommandOutcome::StorageDeleted {
                    storage_id,
                    removed_items: removed.items().len(),
                })
            }
            InventoryCommand::AddItem(cmd) => {
                let storage_id = cmd.storage_id.clone();
                let item_id = self.add_item(cmd)?;
                Ok(CommandOutcome::ItemAdded {
                    storage_id,
                    item_id,
                })
            }
            InventoryCommand::UpdateItem(cmd) => {
                let (storage_id, item_id) = (cmd.storage_id.clone(), cmd.item_id);
                self.update_item(cmd)?;
                Ok(CommandOutcome::ItemUpdated {
                    storage_id,
                    item_id,
                })
            }
            InventoryCommand::DeleteItem(cmd) => {
                let storage_id = cmd.storage_id.clone();
                let removed = self.delete_item(cmd)?;
                Ok(CommandOutcome::ItemDeleted {
                    storage_id,
                    item_id: removed.item_id(),
                })
            }
            InventoryCommand::AddTaxonomyValue(cmd) => {
                let kind = cmd.kind;
                let changed = self.add_taxonomy_value(cmd)?;
                Ok(CommandOutcome::TaxonomyChanged { kind, changed })
            }
            InventoryCommand::RemoveTaxonomyValue(cmd) => {
                let kind = cmd.kind;
                self.remove_taxonomy_value(cmd)?;
                Ok(CommandOutcome::TaxonomyChanged {
                    kind,
                    changed: true,
                })
            }
        }
    }

    /// Create an empty storage under a freshly generated id.
    pub fn create_storage(&mut self, cmd: CreateStorage) -> DomainResult<StorageId> {
        self.create_storage_with(cmd, StorageId::generate)
    }

    /// Like [`create_storage`](Self::create_storage) with a caller-supplied id
    /// source. Draws that collide with an existing id are discarded.
    pub fn create_storage_with<F>(&mut self, cmd: CreateStorage, draw: F) -> DomainResult<StorageId>
    where
        F: FnMut() -> StorageId,
    {
        let id = self.fresh_storage_id(draw)?;
        let storage = Storage::create(id.clone(), cmd.storage, self.taxonomies(), cmd.occurred_at)?;
        self.state.insert_storage(storage)?;
        Ok(id)
    }

    /// Insert a fully built storage (seed data, imports). Fails if the id is taken.
    pub fn insert_storage(&mut self, storage: Storage) -> DomainResult<()> {
        self.state.insert_storage(storage)
    }

    pub fn update_storage(&mut self, cmd: UpdateStorage) -> DomainResult<()> {
        self.storage(&cmd.storage_id)?;
        cmd.patch.validate(self.state.taxonomies())?;

        let storage = self.state.storage_mut(&cmd.storage_id)?;
        storage.apply(cmd.patch, cmd.occurred_at);
        Ok(())
    }

    /// Remove a storage and every item in it. Returns the removed record.
    pub fn delete_storage(&mut self, cmd: DeleteStorage) -> DomainResult<Storage> {
        self.state.remove_storage(&cmd.storage_id)
    }

    /// Append an item to a storage and return its id.
    pub fn add_item(&mut self, cmd: AddItem) -> DomainResult<ItemId> {
        if !self.state.contains_storage(&cmd.storage_id) {
            return Err(DomainError::not_found(format!("storage {}", cmd.storage_id)));
        }
        let item = Item::create(cmd.item, self.state.taxonomies())?;
        let item_id = item.item_id();
        self.state
            .storage_mut(&cmd.storage_id)?
            .push_item(item, cmd.occurred_at);
        Ok(item_id)
    }

    pub fn update_item(&mut self, cmd: UpdateItem) -> DomainResult<()> {
        // Resolve first so a bad reference wins over a bad patch.
        self.item(&cmd.storage_id, cmd.item_id)?;
        cmd.patch.validate(self.state.taxonomies())?;

        let storage = self.state.storage_mut(&cmd.storage_id)?;
        storage.item_mut(cmd.item_id)?.apply(cmd.patch);
        storage.touch(cmd.occurred_at);
        Ok(())
    }

    /// Remove exactly one item; the others keep their relative order.
    pub fn delete_item(&mut self, cmd: DeleteItem) -> DomainResult<Item> {
        self.state
            .storage_mut(&cmd.storage_id)?
            .remove_item(cmd.item_id, cmd.occurred_at)
    }

    /// Append a label to a taxonomy set. Returns `false` if it already existed.
    pub fn add_taxonomy_value(&mut self, cmd: AddTaxonomyValue) -> DomainResult<bool> {
        let value = cmd.value.trim();
        require_non_blank(cmd.kind.member_label(), value)?;
        Ok(self.state.taxonomies_mut().get_mut(cmd.kind).insert(value))
    }

    /// Remove a label from a taxonomy set.
    ///
    /// Records already using the label keep it. The last label of a set cannot
    /// be removed.
    pub fn remove_taxonomy_value(&mut self, cmd: RemoveTaxonomyValue) -> DomainResult<()> {
        let kind: TaxonomyKind = cmd.kind;
        let value = cmd.value.trim();
        let set = self.state.taxonomies_mut().get_mut(kind);
        if !set.contains(value) {
            return Err(DomainError::not_found(format!(
                "{} {value:?} in {kind}",
                kind.member_label()
            )));
        }
        if set.len() == 1 {
            return Err(DomainError::validation(format!(
                "cannot remove the last value of {kind}"
            )));
        }
        set.remove(value);
        Ok(())
    }

    fn fresh_storage_id<F>(&self, mut draw: F) -> DomainResult<StorageId>
    where
        F: FnMut() -> StorageId,
    {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = draw();
            if !self.state.contains_storage(&candidate) {
                return Ok(candidate);
            }
        }
        Err(DomainError::invariant(format!(
            "no unused storage id after {MAX_ID_ATTEMPTS} attempts"
        )))
    }
}
