//! Entity hierarchy components
//!
//! Parent-child relationships between scene nodes for transform propagation.

use hecs::Entity;
use smallvec::SmallVec;

/// Parent component - indicates this entity has a parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent(pub Entity);

impl Parent {
    /// Get the parent entity
    #[must_use]
    pub const fn entity(&self) -> Entity {
        self.0
    }
}

/// Children component - ordered list of an entity's children
#[derive(Debug, Clone, Default)]
pub struct Children(pub SmallVec<[Entity; 8]>);

impl Children {
    /// Add a child; duplicates are ignored
    pub fn add(&mut self, child: Entity) {
        if !self.0.contains(&child) {
            self.0.push(child);
        }
    }

    /// Remove a child, returning whether it was present
    pub fn remove(&mut self, child: Entity) -> bool {
        if let Some(pos) = self.0.iter().position(|&e| e == child) {
            self.0.remove(pos);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over children in insertion order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Entity> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_add_remove() {
        let mut world = hecs::World::new();
        let entity1 = world.spawn(());
        let entity2 = world.spawn(());

        let mut children = Children::default();
        children.add(entity1);
        children.add(entity2);
        assert_eq!(children.len(), 2);

        // No duplicates
        children.add(entity1);
        assert_eq!(children.len(), 2);

        assert!(children.remove(entity1));
        assert!(!children.remove(entity1));
        assert_eq!(children.iter().copied().collect::<Vec<_>>(), vec![entity2]);
    }
}
