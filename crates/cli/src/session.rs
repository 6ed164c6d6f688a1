//! One user's interaction with the inventory.
//!
//! The session owns the loaded [`InventoryStore`] and the gateway it came
//! from, plus transient presentation state ([`ViewState`], rendered codes)
//! that is never serialized.

use std::collections::HashMap;

use thiserror::Error;

use labinv_core::{DomainError, DomainResult, ItemId, StorageId, Timestamp};
use labinv_infra::{PersistenceGateway, load_or_seed};
use labinv_inventory::{
    CodeRenderer, CommandOutcome, DeleteItem, DeleteStorage, InventoryCommand, InventoryStore,
    RenderError, RenderedCode, storage_link,
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Something the user asked to delete and has not confirmed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Storage(StorageId),
    Item {
        storage_id: StorageId,
        item_id: ItemId,
    },
}

/// What a pending delete will remove, for the confirmation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePrompt {
    pub target: DeleteTarget,
    pub name: String,
    /// Items removed along with a storage (0 for an item).
    pub cascaded_items: usize,
}

/// Presentation state: lives only as long as the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub pending_delete: Option<DeletePrompt>,
    /// Set when the last save failed; the in-memory state is ahead of disk.
    pub unsaved_changes: bool,
}

/// Result of a command applied through the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub outcome: CommandOutcome,
    /// Whether the new state reached the gateway.
    pub saved: bool,
}

pub struct Session<G> {
    store: InventoryStore,
    gateway: G,
    view: ViewState,
    /// Rendered codes keyed by base URL and storage id.
    storage_codes: HashMap<(String, StorageId), RenderedCode>,
}

impl<G: PersistenceGateway> Session<G> {
    /// Load the stored inventory (seed state if missing or corrupt).
    ///
    /// A seeded or upgraded snapshot is saved right away so the item ids it
    /// generated are the ones later sessions see.
    pub fn open(gateway: G) -> Self {
        let snapshot = load_or_seed(&gateway);
        let mut view = ViewState::default();
        if snapshot.source.needs_save() {
            let saved = gateway.save(&snapshot.state);
            tracing::info!(source = ?snapshot.source, saved, "stored generated item ids");
            view.unsaved_changes = !saved;
        }
        Self {
            store: InventoryStore::new(snapshot.state),
            gateway,
            view,
            storage_codes: HashMap::new(),
        }
    }

    pub fn store(&self) -> &InventoryStore {
        &self.store
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Apply one command and save the whole state.
    ///
    /// A rejected command changes nothing. A failed save keeps the mutation in
    /// memory and sets [`ViewState::unsaved_changes`].
    pub fn apply(&mut self, command: InventoryCommand) -> DomainResult<Applied> {
        let command_type = command.command_type();
        let outcome = self.store.handle(command).inspect_err(|err| {
            tracing::warn!(command = command_type, error = %err, "command rejected");
        })?;

        if let CommandOutcome::StorageDeleted { storage_id, .. } = &outcome {
            self.storage_codes.retain(|(_, cached), _| cached != storage_id);
        }
        let stale = self
            .view
            .pending_delete
            .as_ref()
            .is_some_and(|pending| self.target_is_gone(&pending.target));
        if stale {
            self.view.pending_delete = None;
        }

        let saved = if outcome.changed_state() || self.view.unsaved_changes {
            self.gateway.save(self.store.state())
        } else {
            true
        };
        self.view.unsaved_changes = !saved;

        tracing::info!(command = command_type, saved, "command applied");
        Ok(Applied { outcome, saved })
    }

    /// Record a delete request and describe what it would remove.
    pub fn request_delete(&mut self, target: DeleteTarget) -> DomainResult<DeletePrompt> {
        let prompt = match &target {
            DeleteTarget::Storage(storage_id) => {
                let storage = self.store.storage(storage_id)?;
                DeletePrompt {
                    name: storage.name().to_string(),
                    cascaded_items: storage.items().len(),
                    target: target.clone(),
                }
            }
            DeleteTarget::Item {
                storage_id,
                item_id,
            } => {
                let item = self.store.item(storage_id, *item_id)?;
                DeletePrompt {
                    name: item.name().to_string(),
                    cascaded_items: 0,
                    target: target.clone(),
                }
            }
        };
        self.view.pending_delete = Some(prompt.clone());
        Ok(prompt)
    }

    /// Carry out the pending delete.
    pub fn confirm_delete(&mut self, at: Timestamp) -> DomainResult<Applied> {
        let prompt = self
            .view
            .pending_delete
            .take()
            .ok_or_else(|| DomainError::validation("no delete awaiting confirmation"))?;

        let command = match prompt.target {
            DeleteTarget::Storage(storage_id) => {
                InventoryCommand::DeleteStorage(DeleteStorage { storage_id })
            }
            DeleteTarget::Item {
                storage_id,
                item_id,
            } => InventoryCommand::DeleteItem(DeleteItem {
                storage_id,
                item_id,
                occurred_at: at,
            }),
        };
        self.apply(command)
    }

    pub fn cancel_delete(&mut self) -> Option<DeletePrompt> {
        self.view.pending_delete.take()
    }

    /// Rendered code for a storage's deep link under `base_url`, cached until
    /// the storage is deleted.
    pub fn storage_code(
        &mut self,
        renderer: &dyn CodeRenderer,
        base_url: &str,
        storage_id: &StorageId,
    ) -> Result<&RenderedCode, SessionError> {
        self.store.storage(storage_id)?;
        let key = (base_url.to_string(), storage_id.clone());
        if !self.storage_codes.contains_key(&key) {
            let rendered = renderer.render(&storage_link(base_url, storage_id)?)?;
            self.storage_codes.insert(key.clone(), rendered);
        }
        self.storage_codes
            .get(&key)
            .ok_or_else(|| SessionError::Domain(DomainError::not_found(format!("code for {storage_id}"))))
    }

    fn target_is_gone(&self, target: &DeleteTarget) -> bool {
        match target {
            DeleteTarget::Storage(storage_id) => self.store.storage(storage_id).is_err(),
            DeleteTarget::Item {
                storage_id,
                item_id,
            } => self.store.item(storage_id, *item_id).is_err(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use labinv_infra::{InMemoryGateway, JsonFileGateway, SEED_STORAGE_ID};
    use labinv_inventory::{AddItem, CreateStorage, NewItem, NewStorage, UpdateStorage, StoragePatch};

    fn at(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    fn seed_id() -> StorageId {
        SEED_STORAGE_ID.parse().unwrap()
    }

    /// Renders the payload verbatim and counts calls.
    #[derive(Default)]
    struct EchoRenderer {
        calls: Cell<usize>,
    }

    impl CodeRenderer for EchoRenderer {
        fn render(&self, payload: &str) -> Result<RenderedCode, RenderError> {
            self.calls.set(self.calls.get() + 1);
            Ok(RenderedCode {
                media_type: "text/plain",
                bytes: payload.as_bytes().to_vec(),
            })
        }

        fn file_extension(&self) -> &'static str {
            "txt"
        }
    }

    #[test]
    fn applied_command_is_saved() {
        let mut session = Session::open(InMemoryGateway::new());
        let opened = session.gateway().save_count();

        let applied = session
            .apply(InventoryCommand::CreateStorage(CreateStorage {
                storage: NewStorage::new("Cabinet A", "Room 1", "cabinet"),
                occurred_at: at("2024-06-01 10:00:00"),
            }))
            .unwrap();

        assert!(applied.saved);
        assert_eq!(session.gateway().save_count(), opened + 1);
        let reloaded = session.gateway().load().unwrap();
        assert_eq!(&reloaded, session.store().state());
    }

    #[test]
    fn rejected_command_changes_nothing_and_does_not_save() {
        let mut session = Session::open(InMemoryGateway::new());
        let before = session.store().clone();
        let opened = session.gateway().save_count();

        let err = session
            .apply(InventoryCommand::AddItem(AddItem {
                storage_id: "storage_nope".parse().unwrap(),
                item: NewItem::new("Battery", "1"),
                occurred_at: at("2024-06-01 10:00:00"),
            }))
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(session.store(), &before);
        assert_eq!(session.gateway().save_count(), opened);
    }

    #[test]
    fn failed_save_keeps_mutation_and_flags_view() {
        let gateway = InMemoryGateway::new();
        gateway.set_fail_writes(true);
        let mut session = Session::open(gateway);
        assert!(session.view().unsaved_changes);

        let applied = session
            .apply(InventoryCommand::UpdateStorage(UpdateStorage {
                storage_id: seed_id(),
                patch: StoragePatch {
                    name: Some("Renamed".into()),
                    ..StoragePatch::default()
                },
                occurred_at: at("2024-06-01 10:00:00"),
            }))
            .unwrap();

        assert!(!applied.saved);
        assert!(session.view().unsaved_changes);
        assert_eq!(session.store().storage(&seed_id()).unwrap().name(), "Renamed");

        session.gateway().set_fail_writes(false);
        let applied = session
            .apply(InventoryCommand::AddItem(AddItem {
                storage_id: seed_id(),
                item: NewItem::new("Charger", "1 unit").category("Chargers"),
                occurred_at: at("2024-06-01 10:01:00"),
            }))
            .unwrap();
        assert!(applied.saved);
        assert!(!session.view().unsaved_changes);
    }

    #[test]
    fn storage_delete_needs_confirmation_and_reports_cascade() {
        let mut session = Session::open(InMemoryGateway::new());

        let prompt = session
            .request_delete(DeleteTarget::Storage(seed_id()))
            .unwrap();
        assert_eq!(prompt.name, "Main Storage");
        assert_eq!(prompt.cascaded_items, 2);
        assert!(session.store().storage(&seed_id()).is_ok());

        let applied = session.confirm_delete(at("2024-06-01 10:00:00")).unwrap();
        assert_eq!(
            applied.outcome,
            CommandOutcome::StorageDeleted {
                storage_id: seed_id(),
                removed_items: 2
            }
        );
        assert!(session.view().pending_delete.is_none());
        assert!(session.store().storage(&seed_id()).is_err());

        let err = session.confirm_delete(at("2024-06-01 10:00:00")).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn cancelled_delete_leaves_item_in_place() {
        let mut session = Session::open(InMemoryGateway::new());
        let item_id = session.store().item_id_at(&seed_id(), 1).unwrap();
        let opened = session.gateway().save_count();

        session
            .request_delete(DeleteTarget::Item {
                storage_id: seed_id(),
                item_id,
            })
            .unwrap();
        let cancelled = session.cancel_delete().unwrap();

        assert_eq!(cancelled.name, "LiPo Batteries");
        assert!(session.store().item(&seed_id(), item_id).is_ok());
        assert_eq!(session.gateway().save_count(), opened);
    }

    #[test]
    fn stale_delete_request_is_rejected_up_front() {
        let mut session = Session::open(InMemoryGateway::new());
        let err = session
            .request_delete(DeleteTarget::Item {
                storage_id: seed_id(),
                item_id: ItemId::new(),
            })
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(session.view().pending_delete.is_none());
    }

    #[test]
    fn storage_code_is_cached_and_dropped_on_delete() {
        let mut session = Session::open(InMemoryGateway::new());
        let renderer = EchoRenderer::default();

        let first = session
            .storage_code(&renderer, "https://lab.example/", &seed_id())
            .unwrap()
            .clone();
        session
            .storage_code(&renderer, "https://lab.example/", &seed_id())
            .unwrap();
        assert_eq!(renderer.calls.get(), 1);
        assert_eq!(first.bytes, b"https://lab.example/?storage=storage_1");

        session
            .request_delete(DeleteTarget::Storage(seed_id()))
            .unwrap();
        session.confirm_delete(at("2024-06-01 10:00:00")).unwrap();

        let err = session
            .storage_code(&renderer, "https://lab.example/", &seed_id())
            .unwrap_err();
        assert!(matches!(err, SessionError::Domain(DomainError::NotFound(_))));
        assert_eq!(renderer.calls.get(), 1);
    }

    #[test]
    fn storage_code_is_rendered_per_base_url() {
        let mut session = Session::open(InMemoryGateway::new());
        let renderer = EchoRenderer::default();

        session
            .storage_code(&renderer, "https://lab.example/", &seed_id())
            .unwrap();
        let other = session
            .storage_code(&renderer, "http://10.0.0.5:8501/", &seed_id())
            .unwrap()
            .clone();

        assert_eq!(renderer.calls.get(), 2);
        assert_eq!(other.bytes, b"http://10.0.0.5:8501/?storage=storage_1");
    }

    fn item_ids(store: &InventoryStore) -> Vec<ItemId> {
        store
            .storages()
            .flat_map(|storage| storage.items().iter().map(|item| item.item_id()))
            .collect()
    }

    #[test]
    fn seeded_item_ids_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory_data.json");

        let first = Session::open(JsonFileGateway::new(&path));
        assert!(!first.view().unsaved_changes);
        assert!(path.exists());
        let second = Session::open(JsonFileGateway::new(&path));

        assert_eq!(item_ids(first.store()), item_ids(second.store()));
        assert_eq!(item_ids(second.store()).len(), 2);
    }

    #[test]
    fn upgraded_item_ids_survive_reopening() {
        let legacy = br#"{
  "storages": {
    "storage_1": {
      "id": "storage_1",
      "name": "Main Storage",
      "type": "shelf",
      "location": "Drone Lab AIC",
      "items": [{"name": "Spare props", "quantity": "12", "status": "Available"}],
      "last_updated": "2024-01-10 17:45:12",
      "created_date": "2024-01-10"
    }
  },
  "categories": ["Other"],
  "storage_types": ["shelf"]
}"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory_data.json");
        std::fs::write(&path, legacy).unwrap();

        let first = Session::open(JsonFileGateway::new(&path));
        let second = Session::open(JsonFileGateway::new(&path));

        assert_eq!(item_ids(first.store()), item_ids(second.store()));
        assert_eq!(item_ids(first.store()).len(), 1);
    }

    #[test]
    fn corrupt_document_is_not_overwritten_on_open() {
        let gateway = InMemoryGateway::with_document(b"{ not json".to_vec());
        let session = Session::open(gateway);

        assert_eq!(session.gateway().save_count(), 0);
        assert_eq!(session.gateway().document().unwrap(), b"{ not json");
    }
}
