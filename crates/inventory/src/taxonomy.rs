//! Configurable enumerations: categories, status options and storage types.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use labinv_core::{DomainError, DomainResult, ValueObject};

/// Category assigned to items created without one.
pub const DEFAULT_CATEGORY: &str = "Other";

/// Status counted as "available" in summaries.
pub const AVAILABLE_STATUS: &str = "Available";

/// Ordered set of labels (insertion order kept, no duplicates).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Taxonomy(Vec<String>);

impl Taxonomy {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut taxonomy = Self::new();
        for value in values {
            taxonomy.insert(value);
        }
        taxonomy
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|v| v == value)
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a value; returns `false` if it was already present.
    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if self.contains(&value) {
            return false;
        }
        self.0.push(value);
        true
    }

    /// Remove a value; returns `false` if it was not present.
    pub fn remove(&mut self, value: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|v| v != value);
        self.0.len() != before
    }
}

impl ValueObject for Taxonomy {}

impl From<Vec<String>> for Taxonomy {
    fn from(values: Vec<String>) -> Self {
        Self::from_values(values)
    }
}

impl From<Taxonomy> for Vec<String> {
    fn from(value: Taxonomy) -> Self {
        value.0
    }
}

/// Which of the three taxonomy sets an operation targets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyKind {
    Categories,
    StatusOptions,
    StorageTypes,
}

impl TaxonomyKind {
    pub const ALL: [TaxonomyKind; 3] = [
        TaxonomyKind::Categories,
        TaxonomyKind::StatusOptions,
        TaxonomyKind::StorageTypes,
    ];

    /// Document key of the set.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxonomyKind::Categories => "categories",
            TaxonomyKind::StatusOptions => "status_options",
            TaxonomyKind::StorageTypes => "storage_types",
        }
    }

    /// Singular label of one member, for messages.
    pub fn member_label(&self) -> &'static str {
        match self {
            TaxonomyKind::Categories => "category",
            TaxonomyKind::StatusOptions => "status",
            TaxonomyKind::StorageTypes => "storage type",
        }
    }
}

impl core::fmt::Display for TaxonomyKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaxonomyKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "categories" | "category" => Ok(TaxonomyKind::Categories),
            "status_options" | "statuses" | "status" => Ok(TaxonomyKind::StatusOptions),
            "storage_types" | "types" | "type" => Ok(TaxonomyKind::StorageTypes),
            other => Err(DomainError::validation(format!(
                "unknown taxonomy {other:?} (expected categories, status_options or storage_types)"
            ))),
        }
    }
}

/// The three taxonomy sets of a store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomies {
    pub categories: Taxonomy,
    pub status_options: Taxonomy,
    pub storage_types: Taxonomy,
}

impl Taxonomies {
    /// Defaults for a drone/electronics lab.
    pub fn lab_defaults() -> Self {
        Self {
            categories: Taxonomy::from_values([
                "Drones",
                "Batteries",
                "Controllers",
                "Propellers",
                "Cameras",
                "Sensors",
                "Chargers",
                "Tools",
                "Electronics",
                "Stationary",
                DEFAULT_CATEGORY,
            ]),
            status_options: Taxonomy::from_values([
                AVAILABLE_STATUS,
                "In Use",
                "Maintenance",
                "Broken",
                "Reserved",
            ]),
            storage_types: Taxonomy::from_values([
                "shelf",
                "cabinet",
                "drawer",
                "rack",
                "storage_room",
                "toolbox",
                "other",
            ]),
        }
    }

    pub fn get(&self, kind: TaxonomyKind) -> &Taxonomy {
        match kind {
            TaxonomyKind::Categories => &self.categories,
            TaxonomyKind::StatusOptions => &self.status_options,
            TaxonomyKind::StorageTypes => &self.storage_types,
        }
    }

    pub fn get_mut(&mut self, kind: TaxonomyKind) -> &mut Taxonomy {
        match kind {
            TaxonomyKind::Categories => &mut self.categories,
            TaxonomyKind::StatusOptions => &mut self.status_options,
            TaxonomyKind::StorageTypes => &mut self.storage_types,
        }
    }

    /// Fail with a validation error unless `value` is a member of `kind`.
    pub fn ensure_member(&self, kind: TaxonomyKind, value: &str) -> DomainResult<()> {
        if self.get(kind).contains(value) {
            Ok(())
        } else {
            Err(DomainError::validation(format!(
                "{} {value:?} is not one of the configured {kind}",
                kind.member_label()
            )))
        }
    }

    /// Status given to items created without one.
    pub fn default_status(&self) -> DomainResult<&str> {
        self.status_options
            .first()
            .ok_or_else(|| DomainError::validation("no status options configured"))
    }
}
