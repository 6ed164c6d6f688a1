//! Default document used when no inventory has been saved yet.

use labinv_core::{DomainResult, StorageId, Timestamp};
use labinv_inventory::{
    AddItem, InventoryStore, NewItem, NewStorage, Storage, StoreState, Taxonomies,
};

/// Id of the example storage in the seed state.
pub const SEED_STORAGE_ID: &str = "storage_1";

/// Seed state stamped with the current time.
pub fn seed_state() -> StoreState {
    seed_state_at(Timestamp::now())
}

/// One example storage holding two example items, plus the lab's default
/// taxonomy sets.
pub fn seed_state_at(at: Timestamp) -> StoreState {
    build_seed(at).unwrap_or_else(|err| {
        tracing::error!(error = %err, "failed to build seed inventory; starting empty");
        StoreState::new(Taxonomies::lab_defaults())
    })
}

fn build_seed(at: Timestamp) -> DomainResult<StoreState> {
    let mut store = InventoryStore::empty(Taxonomies::lab_defaults());
    let storage_id: StorageId = SEED_STORAGE_ID.parse()?;

    let storage = Storage::create(
        storage_id.clone(),
        NewStorage::new("Main Storage", "Drone Lab AIC", "shelf")
            .description("Primary storage for drone equipment"),
        store.taxonomies(),
        at,
    )?;
    store.insert_storage(storage)?;

    for item in [
        NewItem::new("DJI Mavic 3", "2 units")
            .category("Drones")
            .status("Available"),
        NewItem::new("LiPo Batteries", "10 units")
            .category("Batteries")
            .status("Available"),
    ] {
        store.add_item(AddItem {
            storage_id: storage_id.clone(),
            item,
            occurred_at: at,
        })?;
    }

    Ok(store.into_state())
}

#[cfg(test)]
mod tests {
    use super::*;
    use labinv_inventory::TaxonomyKind;

    #[test]
    fn seed_has_example_storage_and_valid_taxonomies() {
        let at: Timestamp = "2024-01-15 12:00:00".parse().unwrap();
        let state = seed_state_at(at);

        assert_eq!(state.storage_count(), 1);
        assert_eq!(state.item_count(), 2);

        let storage = state
            .storage(&SEED_STORAGE_ID.parse().unwrap())
            .expect("seed storage");
        assert_eq!(storage.name(), "Main Storage");
        assert_eq!(storage.last_updated(), at);

        let tax = state.taxonomies();
        for kind in TaxonomyKind::ALL {
            assert!(!tax.get(kind).is_empty());
        }
        for item in storage.items() {
            assert!(tax.categories.contains(item.category()));
            assert!(tax.status_options.contains(item.status()));
        }
        assert!(tax.storage_types.contains(storage.storage_type()));
    }
}
