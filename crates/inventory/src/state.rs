//! The persisted state: every storage plus the taxonomy sets.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use labinv_core::{DomainError, DomainResult, StorageId};

use crate::storage::Storage;
use crate::taxonomy::Taxonomies;

/// Complete snapshot of an inventory, serialized as one document.
///
/// The document has exactly four top-level keys: `storages`, `categories`,
/// `status_options` and `storage_types`. Storages keep creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreState {
    storages: IndexMap<StorageId, Storage>,
    #[serde(flatten)]
    taxonomies: Taxonomies,
}

impl StoreState {
    /// State with no storages.
    pub fn new(taxonomies: Taxonomies) -> Self {
        Self {
            storages: IndexMap::new(),
            taxonomies,
        }
    }

    pub fn storages(&self) -> impl ExactSizeIterator<Item = &Storage> {
        self.storages.values()
    }

    pub fn storage(&self, storage_id: &StorageId) -> Option<&Storage> {
        self.storages.get(storage_id)
    }

    pub fn contains_storage(&self, storage_id: &StorageId) -> bool {
        self.storages.contains_key(storage_id)
    }

    pub fn storage_count(&self) -> usize {
        self.storages.len()
    }

    pub fn item_count(&self) -> usize {
        self.storages.values().map(|s| s.items().len()).sum()
    }

    pub fn taxonomies(&self) -> &Taxonomies {
        &self.taxonomies
    }

    /// Check structural consistency of a freshly decoded document: every
    /// storage is filed under its own id and no storage holds two items with
    /// the same id.
    pub fn check_consistency(&self) -> DomainResult<()> {
        for (key, storage) in &self.storages {
            if key != storage.storage_id() {
                return Err(DomainError::invariant(format!(
                    "storage filed under {key} carries id {}",
                    storage.storage_id()
                )));
            }
            let mut seen = HashSet::with_capacity(storage.items().len());
            if let Some(dup) = storage.items().iter().find(|item| !seen.insert(item.item_id())) {
                return Err(DomainError::invariant(format!(
                    "storage {key} holds item id {} more than once",
                    dup.item_id()
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn storage_mut(&mut self, storage_id: &StorageId) -> DomainResult<&mut Storage> {
        self.storages
            .get_mut(storage_id)
            .ok_or_else(|| DomainError::not_found(format!("storage {storage_id}")))
    }

    pub(crate) fn insert_storage(&mut self, storage: Storage) -> DomainResult<()> {
        if self.storages.contains_key(storage.storage_id()) {
            return Err(DomainError::invariant(format!(
                "storage {} already exists",
                storage.storage_id()
            )));
        }
        self.storages.insert(storage.storage_id().clone(), storage);
        Ok(())
    }

    /// Remove a storage, keeping the order of the others.
    pub(crate) fn remove_storage(&mut self, storage_id: &StorageId) -> DomainResult<Storage> {
        self.storages
            .shift_remove(storage_id)
            .ok_or_else(|| DomainError::not_found(format!("storage {storage_id}")))
    }

    pub(crate) fn taxonomies_mut(&mut self) -> &mut Taxonomies {
        &mut self.taxonomies
    }
}
