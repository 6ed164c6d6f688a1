//! Read-only views over a [`StoreState`]: dashboard counts and the flat
//! "all items" listing.

use indexmap::IndexMap;
use serde::Serialize;

use labinv_core::StorageId;

use crate::item::Item;
use crate::state::StoreState;
use crate::storage::Storage;
use crate::taxonomy::AVAILABLE_STATUS;

/// Dashboard counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventorySummary {
    pub storage_count: usize,
    pub item_count: usize,
    pub available_count: usize,
    /// Item count per status, configured statuses first (in set order), then
    /// any legacy values found on records.
    pub by_status: IndexMap<String, usize>,
    /// Item count per category, same ordering rule as `by_status`.
    pub by_category: IndexMap<String, usize>,
}

impl InventorySummary {
    pub fn of(state: &StoreState) -> Self {
        let taxonomies = state.taxonomies();
        let mut by_status: IndexMap<String, usize> = taxonomies
            .status_options
            .iter()
            .map(|s| (s.to_string(), 0))
            .collect();
        let mut by_category: IndexMap<String, usize> = taxonomies
            .categories
            .iter()
            .map(|c| (c.to_string(), 0))
            .collect();

        let mut item_count = 0;
        let mut available_count = 0;
        for item in state.storages().flat_map(|s| s.items()) {
            item_count += 1;
            if item.status() == AVAILABLE_STATUS {
                available_count += 1;
            }
            *by_status.entry(item.status().to_string()).or_default() += 1;
            *by_category.entry(item.category().to_string()).or_default() += 1;
        }

        Self {
            storage_count: state.storage_count(),
            item_count,
            available_count,
            by_status,
            by_category,
        }
    }
}

/// Filter for [`list_items`]. Empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub storage_id: Option<StorageId>,
    pub category: Option<String>,
    pub status: Option<String>,
    /// Case-insensitive substring of name, specs or notes.
    pub text: Option<String>,
}

impl ItemFilter {
    pub fn matches(&self, storage: &Storage, item: &Item) -> bool {
        if self
            .storage_id
            .as_ref()
            .is_some_and(|id| id != storage.storage_id())
        {
            return false;
        }
        if self.category.as_deref().is_some_and(|c| c != item.category()) {
            return false;
        }
        if self.status.as_deref().is_some_and(|s| s != item.status()) {
            return false;
        }
        match self.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            None => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                [Some(item.name()), item.specs(), item.notes()]
                    .into_iter()
                    .flatten()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
        }
    }
}

/// One line of the flat item listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemRow<'a> {
    pub storage: &'a Storage,
    /// Position within the storage at the time of listing.
    pub position: usize,
    pub item: &'a Item,
}

/// Every item matching `filter`, storages in creation order, items in
/// insertion order.
pub fn list_items<'a>(state: &'a StoreState, filter: &ItemFilter) -> Vec<ItemRow<'a>> {
    state
        .storages()
        .flat_map(|storage| {
            storage
                .items()
                .iter()
                .enumerate()
                .map(move |(position, item)| ItemRow {
                    storage,
                    position,
                    item,
                })
        })
        .filter(|row| filter.matches(row.storage, row.item))
        .collect()
}
