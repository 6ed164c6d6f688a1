use serde::{Deserialize, Serialize};

use labinv_core::{DomainResult, Entity, ItemId, require_non_blank};

use crate::taxonomy::{DEFAULT_CATEGORY, Taxonomies, TaxonomyKind};

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// A quantity of one kind of equipment held in a storage unit.
///
/// `quantity` is free text ("5 units", "1 box"); no arithmetic is done on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Documents written before items carried ids get a fresh one on load.
    #[serde(default)]
    id: ItemId,
    name: String,
    quantity: String,
    #[serde(default = "default_category")]
    category: String,
    status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    specs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

/// Input for a new item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub quantity: String,
    /// Defaults to [`DEFAULT_CATEGORY`].
    pub category: Option<String>,
    /// Defaults to the first configured status.
    pub status: Option<String>,
    pub specs: Option<String>,
    pub notes: Option<String>,
}

impl NewItem {
    pub fn new(name: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
            ..Self::default()
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn specs(mut self, specs: impl Into<String>) -> Self {
        self.specs = Some(specs.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Partial update of an item: `None` leaves a field unchanged.
///
/// For `specs` and `notes`, `Some("")` clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub quantity: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub specs: Option<String>,
    pub notes: Option<String>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub(crate) fn validate(&self, taxonomies: &Taxonomies) -> DomainResult<()> {
        if let Some(name) = &self.name {
            require_non_blank("item name", name)?;
        }
        if let Some(quantity) = &self.quantity {
            require_non_blank("item quantity", quantity)?;
        }
        if let Some(category) = &self.category {
            taxonomies.ensure_member(TaxonomyKind::Categories, category)?;
        }
        if let Some(status) = &self.status {
            taxonomies.ensure_member(TaxonomyKind::StatusOptions, status)?;
        }
        Ok(())
    }
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Item {
    /// Validate `new` against the taxonomies and build the record.
    pub fn create(new: NewItem, taxonomies: &Taxonomies) -> DomainResult<Self> {
        require_non_blank("item name", &new.name)?;
        require_non_blank("item quantity", &new.quantity)?;

        let category = match new.category {
            Some(category) => {
                taxonomies.ensure_member(TaxonomyKind::Categories, &category)?;
                category
            }
            None => default_category(),
        };
        let status = match new.status {
            Some(status) => {
                taxonomies.ensure_member(TaxonomyKind::StatusOptions, &status)?;
                status
            }
            None => taxonomies.default_status()?.to_string(),
        };

        Ok(Self {
            id: ItemId::new(),
            name: new.name,
            quantity: new.quantity,
            category,
            status,
            specs: optional_text(new.specs),
            notes: optional_text(new.notes),
        })
    }

    pub fn item_id(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> &str {
        &self.quantity
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn specs(&self) -> Option<&str> {
        self.specs.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Apply an already validated patch.
    pub(crate) fn apply(&mut self, patch: ItemPatch) {
        let ItemPatch {
            name,
            quantity,
            category,
            status,
            specs,
            notes,
        } = patch;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(quantity) = quantity {
            self.quantity = quantity;
        }
        if let Some(category) = category {
            self.category = category;
        }
        if let Some(status) = status {
            self.status = status;
        }
        if specs.is_some() {
            self.specs = optional_text(specs);
        }
        if notes.is_some() {
            self.notes = optional_text(notes);
        }
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labinv_core::DomainError;

    fn tax() -> Taxonomies {
        Taxonomies::lab_defaults()
    }

    #[test]
    fn create_applies_category_and_status_defaults() {
        let item = Item::create(NewItem::new("Multimeter", "1 unit"), &tax()).unwrap();
        assert_eq!(item.category(), DEFAULT_CATEGORY);
        assert_eq!(item.status(), "Available");
        assert_eq!(item.specs(), None);
    }

    #[test]
    fn create_rejects_blank_name_or_quantity() {
        let err = Item::create(NewItem::new("  ", "1 unit"), &tax()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = Item::create(NewItem::new("Multimeter", ""), &tax()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn create_rejects_status_outside_taxonomy() {
        let err = Item::create(
            NewItem::new("Multimeter", "1 unit").status("Lost"),
            &tax(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn blank_specs_are_stored_as_absent() {
        let item = Item::create(
            NewItem::new("Gimbal", "1 unit").specs("   ").notes("spare"),
            &tax(),
        )
        .unwrap();
        assert_eq!(item.specs(), None);
        assert_eq!(item.notes(), Some("spare"));
    }

    #[test]
    fn apply_only_touches_given_fields() {
        let mut item = Item::create(
            NewItem::new("Gimbal", "1 unit").category("Cameras").notes("spare"),
            &tax(),
        )
        .unwrap();
        let before = item.clone();

        item.apply(ItemPatch {
            status: Some("Broken".into()),
            ..ItemPatch::default()
        });

        assert_eq!(item.status(), "Broken");
        assert_eq!(item.name(), before.name());
        assert_eq!(item.quantity(), before.quantity());
        assert_eq!(item.category(), before.category());
        assert_eq!(item.notes(), before.notes());
        assert_eq!(item.item_id(), before.item_id());
    }

    #[test]
    fn empty_patch_text_clears_notes() {
        let mut item = Item::create(NewItem::new("Gimbal", "1 unit").notes("spare"), &tax()).unwrap();
        item.apply(ItemPatch {
            notes: Some(String::new()),
            ..ItemPatch::default()
        });
        assert_eq!(item.notes(), None);
    }

    #[test]
    fn legacy_records_get_id_and_default_category() {
        let json = r#"{"name":"LiPo Batteries","quantity":"10 units","status":"Available"}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.category(), DEFAULT_CATEGORY);
        assert_ne!(item.item_id(), Item::create(NewItem::new("x", "1"), &tax()).unwrap().item_id());

        let written = serde_json::to_value(&item).unwrap();
        assert!(written.get("id").is_some());
        assert!(written.get("specs").is_none());
    }
}
