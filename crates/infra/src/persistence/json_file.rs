use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use labinv_inventory::StoreState;

use super::r#trait::{
    PersistenceError, PersistenceGateway, Snapshot, decode_document, encode_document,
};
use crate::seed::seed_state;

/// Inventory document stored as a JSON file.
///
/// Saves go to a sibling temporary file that is synced and then renamed over
/// the target, so a crash mid-write leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct JsonFileGateway {
    path: PathBuf,
}

impl JsonFileGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Write the seed document if none exists yet. Returns `true` if it wrote one.
    pub fn ensure_document(&self) -> Result<bool, PersistenceError> {
        if self.exists() {
            return Ok(false);
        }
        self.try_save(&seed_state())?;
        Ok(true)
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "inventory.json".to_string());
        self.path.with_file_name(format!(".{name}.tmp"))
    }

    fn io_error(&self, source: io::Error) -> PersistenceError {
        PersistenceError::Io {
            origin: self.origin(),
            source,
        }
    }
}

fn write_and_sync(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

impl PersistenceGateway for JsonFileGateway {
    fn origin(&self) -> String {
        self.path.display().to_string()
    }

    fn load_snapshot(&self) -> Result<Snapshot, PersistenceError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::info!(origin = %self.origin(), "no inventory document yet; using seed state");
                return Ok(Snapshot::seeded());
            }
            Err(err) => return Err(self.io_error(err)),
        };

        let snapshot = decode_document(&bytes, &self.origin())?;
        tracing::debug!(
            origin = %self.origin(),
            storages = snapshot.state.storage_count(),
            items = snapshot.state.item_count(),
            source = ?snapshot.source,
            "inventory loaded"
        );
        Ok(snapshot)
    }

    fn try_save(&self, state: &StoreState) -> Result<(), PersistenceError> {
        let bytes = encode_document(state)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let tmp = self.temp_path();
        if let Err(err) = write_and_sync(&tmp, &bytes) {
            let _ = fs::remove_file(&tmp);
            return Err(self.io_error(err));
        }
        if let Err(err) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(self.io_error(err));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::SnapshotSource;
    use labinv_core::Timestamp;
    use labinv_inventory::{
        AddItem, CreateStorage, InventoryStore, NewItem, NewStorage, Taxonomies,
    };

    fn at(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    /// Two storages, three items, specs/notes on some of them.
    fn populated_state() -> StoreState {
        let mut store = InventoryStore::empty(Taxonomies::lab_defaults());
        let shelf = store
            .create_storage(CreateStorage {
                storage: NewStorage::new("Main Shelf", "Drone Lab AIC", "shelf")
                    .description("Top row: flight-ready"),
                occurred_at: at("2024-02-01 08:30:00"),
            })
            .unwrap();
        let drawer = store
            .create_storage(CreateStorage {
                storage: NewStorage::new("Drawer 3", "Workbench", "drawer"),
                occurred_at: at("2024-02-02 09:00:00"),
            })
            .unwrap();

        for (sid, item, when) in [
            (
                &shelf,
                NewItem::new("DJI Mavic 3", "2 units")
                    .category("Drones")
                    .specs("4/3 CMOS, 46 min"),
                "2024-02-03 10:00:00",
            ),
            (
                &shelf,
                NewItem::new("LiPo 6S", "6 units")
                    .category("Batteries")
                    .status("Maintenance")
                    .notes("balance before use"),
                "2024-02-03 10:05:00",
            ),
            (&drawer, NewItem::new("Hex keys", "1 set"), "2024-02-04 11:00:00"),
        ] {
            store
                .add_item(AddItem {
                    storage_id: sid.clone(),
                    item,
                    occurred_at: at(when),
                })
                .unwrap();
        }
        store.into_state()
    }

    #[test]
    fn missing_file_loads_seed_state() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = JsonFileGateway::new(dir.path().join("inventory_data.json"));

        let snapshot = gateway.load_snapshot().unwrap();
        assert_eq!(snapshot.state.storage_count(), 1);
        assert_eq!(snapshot.source, SnapshotSource::Seeded);
        assert!(!gateway.exists());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = JsonFileGateway::new(dir.path().join("inventory_data.json"));
        let state = populated_state();

        assert!(gateway.save(&state));
        let snapshot = gateway.load_snapshot().unwrap();
        assert_eq!(snapshot.source, SnapshotSource::Stored);
        let loaded = snapshot.state;

        assert_eq!(loaded, state);
        let names: Vec<_> = loaded.storages().map(|s| s.name().to_string()).collect();
        assert_eq!(names, ["Main Shelf", "Drawer 3"]);
    }

    #[test]
    fn saving_twice_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = JsonFileGateway::new(dir.path().join("inventory_data.json"));
        let state = populated_state();

        assert!(gateway.save(&state));
        let once = fs::read(gateway.path()).unwrap();
        let loaded_once = gateway.load().unwrap();

        assert!(gateway.save(&state));
        let twice = fs::read(gateway.path()).unwrap();

        assert_eq!(once, twice);
        assert_eq!(gateway.load().unwrap(), loaded_once);
    }

    #[test]
    fn document_is_pretty_printed_with_exact_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = JsonFileGateway::new(dir.path().join("inventory_data.json"));
        gateway.try_save(&populated_state()).unwrap();

        let text = fs::read_to_string(gateway.path()).unwrap();
        assert!(text.starts_with("{\n  \"storages\": {"));
        assert!(text.contains("\"last_updated\": \"2024-02-03 10:05:00\""));
        assert!(text.contains("\"created_date\": \"2024-02-01\""));
        assert!(text.contains("\"type\": \"shelf\""));
    }

    #[test]
    fn save_leaves_no_temporary_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = JsonFileGateway::new(dir.path().join("inventory_data.json"));
        gateway.try_save(&populated_state()).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, ["inventory_data.json"]);
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = JsonFileGateway::new(dir.path().join("lab").join("inventory.json"));
        assert!(gateway.save(&populated_state()));
        assert!(gateway.exists());
    }

    #[test]
    fn unwritable_target_reports_false_and_keeps_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = JsonFileGateway::new(dir.path().join("inventory_data.json"));
        let original = populated_state();
        gateway.try_save(&original).unwrap();

        // A regular file where the parent directory should be makes every
        // write fail.
        let blocker = dir.path().join("blocked");
        fs::write(&blocker, b"not a directory").unwrap();
        let broken = JsonFileGateway::new(blocker.join("inventory_data.json"));
        assert!(!broken.save(&original));
        assert!(matches!(
            broken.try_save(&original),
            Err(PersistenceError::Io { .. })
        ));

        assert_eq!(gateway.load().unwrap(), original);
    }

    #[test]
    fn unparsable_document_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory_data.json");
        fs::write(&path, b"{\"storages\": {").unwrap();

        let err = JsonFileGateway::new(&path).load().unwrap_err();
        assert!(err.is_corrupt(), "{err}");
    }

    #[test]
    fn missing_top_level_key_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory_data.json");
        fs::write(
            &path,
            br#"{"storages": {}, "categories": ["Other"], "storage_types": ["shelf"]}"#,
        )
        .unwrap();

        let err = JsonFileGateway::new(&path).load().unwrap_err();
        match err {
            PersistenceError::CorruptData { reason, .. } => {
                assert!(reason.contains("status_options"), "{reason}")
            }
            other => panic!("expected CorruptData, got {other:?}"),
        }
    }

    #[test]
    fn legacy_document_without_item_ids_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory_data.json");
        fs::write(
            &path,
            br#"{
  "storages": {
    "storage_1": {
      "id": "storage_1",
      "name": "Main Storage",
      "type": "shelf",
      "location": "Drone Lab AIC",
      "description": "Primary storage for drone equipment",
      "items": [
        {"name": "DJI Mavic 3", "quantity": "2 units", "status": "Available", "category": "Drones"},
        {"name": "Spare props", "quantity": "12", "status": "Available"}
      ],
      "last_updated": "2024-01-10 17:45:12",
      "created_date": "2024-01-10"
    }
  },
  "categories": ["Drones", "Other"],
  "status_options": ["Available", "In Use"],
  "storage_types": ["shelf"]
}"#,
        )
        .unwrap();

        let gateway = JsonFileGateway::new(&path);
        let snapshot = gateway.load_snapshot().unwrap();
        assert_eq!(snapshot.source, SnapshotSource::Upgraded);
        assert!(snapshot.source.needs_save());

        let storage = snapshot.state.storage(&"storage_1".parse().unwrap()).unwrap();
        assert_eq!(storage.items().len(), 2);
        assert_eq!(storage.items()[1].category(), "Other");
        assert_ne!(storage.items()[0].item_id(), storage.items()[1].item_id());
        assert_eq!(storage.last_updated(), at("2024-01-10 17:45:12"));

        // Once written back, the generated ids are what later loads see.
        gateway.try_save(&snapshot.state).unwrap();
        let reloaded = gateway.load_snapshot().unwrap();
        assert_eq!(reloaded.source, SnapshotSource::Stored);
        assert_eq!(reloaded.state, snapshot.state);
    }

    #[test]
    fn duplicate_item_ids_are_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory_data.json");
        let item = r#"{"id": "0190f3c4-5b6a-7c8d-9e0f-000000000001", "name": "Prop", "quantity": "4", "category": "Other", "status": "Available"}"#;
        let document = format!(
            r#"{{
  "storages": {{
    "storage_1": {{
      "id": "storage_1", "name": "Main Storage", "type": "shelf", "location": "Lab",
      "description": "", "items": [{item}, {item}],
      "last_updated": "2024-01-10 17:45:12", "created_date": "2024-01-10"
    }}
  }},
  "categories": ["Other"],
  "status_options": ["Available"],
  "storage_types": ["shelf"]
}}"#
        );
        fs::write(&path, document).unwrap();

        let err = JsonFileGateway::new(&path).load().unwrap_err();
        match err {
            PersistenceError::CorruptData { reason, .. } => {
                assert!(reason.contains("0190f3c4-5b6a-7c8d-9e0f-000000000001"), "{reason}")
            }
            other => panic!("expected CorruptData, got {other:?}"),
        }
    }

    #[test]
    fn ensure_document_writes_seed_once() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = JsonFileGateway::new(dir.path().join("inventory_data.json"));

        assert!(gateway.ensure_document().unwrap());
        let first = fs::read(gateway.path()).unwrap();
        assert!(!gateway.ensure_document().unwrap());
        assert_eq!(fs::read(gateway.path()).unwrap(), first);
    }
}
