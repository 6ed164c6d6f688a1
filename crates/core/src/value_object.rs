//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity: two values with the same attributes are the
/// same value. In this domain timestamps and taxonomy sets are value objects,
/// while storages and items are entities (see [`crate::Entity`]).
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Quantity(String);
///
/// impl ValueObject for Quantity {}
///
/// assert_eq!(Quantity("5 units".into()), Quantity("5 units".into()));
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
