//! Records with a stable identity.

/// A record that keeps its identifier across every edit.
///
/// Storages and items are entities: renaming or moving one does not make it a
/// different record. Lookups go through [`Entity::id`], never through position.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}

/// First entity in `entities` with the given id.
pub fn find_by_id<'a, E: Entity>(entities: &'a [E], id: &E::Id) -> Option<&'a E> {
    entities.iter().find(|e| e.id() == id)
}

pub fn find_by_id_mut<'a, E: Entity>(entities: &'a mut [E], id: &E::Id) -> Option<&'a mut E> {
    entities.iter_mut().find(|e| e.id() == id)
}

/// Index of the entity with the given id.
pub fn position_by_id<E: Entity>(entities: &[E], id: &E::Id) -> Option<usize> {
    entities.iter().position(|e| e.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Tag {
        id: u32,
        label: &'static str,
    }

    impl Entity for Tag {
        type Id = u32;

        fn id(&self) -> &u32 {
            &self.id
        }
    }

    fn tags() -> Vec<Tag> {
        vec![
            Tag { id: 7, label: "drone" },
            Tag { id: 3, label: "battery" },
        ]
    }

    #[test]
    fn lookups_go_by_id_not_position() {
        let mut tags = tags();
        assert_eq!(find_by_id(&tags, &3).map(|t| t.label), Some("battery"));
        assert_eq!(position_by_id(&tags, &3), Some(1));
        assert!(find_by_id(&tags, &1).is_none());

        if let Some(tag) = find_by_id_mut(&mut tags, &7) {
            tag.label = "quadcopter";
        }
        assert_eq!(tags[0].label, "quadcopter");
    }
}
