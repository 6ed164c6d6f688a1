use serde::{Deserialize, Serialize};

use labinv_core::{
    DateStamp, DomainError, DomainResult, Entity, ItemId, StorageId, Timestamp, find_by_id,
    find_by_id_mut, position_by_id, require_non_blank,
};

use crate::item::Item;
use crate::taxonomy::{Taxonomies, TaxonomyKind};

/// A physical storage unit (cabinet, shelf, drawer, ...) and its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Storage {
    id: StorageId,
    name: String,
    #[serde(rename = "type")]
    storage_type: String,
    location: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    items: Vec<Item>,
    last_updated: Timestamp,
    created_date: DateStamp,
}

/// Input for a new storage unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStorage {
    pub name: String,
    pub location: String,
    pub storage_type: String,
    pub description: String,
}

impl NewStorage {
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        storage_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            storage_type: storage_type.into(),
            description: String::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Partial update of a storage's own fields; items are never touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoragePatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub storage_type: Option<String>,
    pub description: Option<String>,
}

impl StoragePatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub(crate) fn validate(&self, taxonomies: &Taxonomies) -> DomainResult<()> {
        if let Some(name) = &self.name {
            require_non_blank("storage name", name)?;
        }
        if let Some(location) = &self.location {
            require_non_blank("storage location", location)?;
        }
        if let Some(storage_type) = &self.storage_type {
            require_non_blank("storage type", storage_type)?;
            taxonomies.ensure_member(TaxonomyKind::StorageTypes, storage_type)?;
        }
        Ok(())
    }
}

impl Storage {
    /// Validate `new` and build an empty storage stamped at `at`.
    pub fn create(
        id: StorageId,
        new: NewStorage,
        taxonomies: &Taxonomies,
        at: Timestamp,
    ) -> DomainResult<Self> {
        require_non_blank("storage name", &new.name)?;
        require_non_blank("storage location", &new.location)?;
        require_non_blank("storage type", &new.storage_type)?;
        taxonomies.ensure_member(TaxonomyKind::StorageTypes, &new.storage_type)?;

        Ok(Self {
            id,
            name: new.name,
            storage_type: new.storage_type,
            location: new.location,
            description: new.description.trim().to_string(),
            items: Vec::new(),
            last_updated: at,
            created_date: at.date(),
        })
    }

    pub fn storage_id(&self) -> &StorageId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn storage_type(&self) -> &str {
        &self.storage_type
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Empty when no description was given.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, item_id: ItemId) -> Option<&Item> {
        find_by_id(&self.items, &item_id)
    }

    pub fn position_of(&self, item_id: ItemId) -> Option<usize> {
        position_by_id(&self.items, &item_id)
    }

    pub fn last_updated(&self) -> Timestamp {
        self.last_updated
    }

    pub fn created_date(&self) -> DateStamp {
        self.created_date
    }

    pub(crate) fn apply(&mut self, patch: StoragePatch, at: Timestamp) {
        let StoragePatch {
            name,
            location,
            storage_type,
            description,
        } = patch;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(location) = location {
            self.location = location;
        }
        if let Some(storage_type) = storage_type {
            self.storage_type = storage_type;
        }
        if let Some(description) = description {
            self.description = description.trim().to_string();
        }
        self.touch(at);
    }

    pub(crate) fn push_item(&mut self, item: Item, at: Timestamp) {
        self.items.push(item);
        self.touch(at);
    }

    pub(crate) fn item_mut(&mut self, item_id: ItemId) -> DomainResult<&mut Item> {
        let storage_id = &self.id;
        find_by_id_mut(&mut self.items, &item_id)
            .ok_or_else(|| DomainError::not_found(format!("item {item_id} in storage {storage_id}")))
    }

    pub(crate) fn remove_item(&mut self, item_id: ItemId, at: Timestamp) -> DomainResult<Item> {
        let position = self.position_of(item_id).ok_or_else(|| {
            DomainError::not_found(format!("item {item_id} in storage {}", self.id))
        })?;
        let removed = self.items.remove(position);
        self.touch(at);
        Ok(removed)
    }

    pub(crate) fn touch(&mut self, at: Timestamp) {
        self.last_updated = at;
    }
}

impl Entity for Storage {
    type Id = StorageId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
