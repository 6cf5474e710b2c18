//! Category membership as ordered handle sets.
//!
//! One entity may belong to several categories at once (a pushable box is
//! both an obstacle and an active body). Each category is an
//! insertion-ordered list of handles; the values themselves live in an
//! [`Arena`](crate::arena::Arena).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Maps category keys to insertion-ordered sets of [`EntityId`]s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryIndex<K: Ord> {
    sets: BTreeMap<K, Vec<EntityId>>,
}

impl<K: Ord + Copy> CategoryIndex<K> {
    /// Create an index with no categories.
    pub fn new() -> Self {
        Self {
            sets: BTreeMap::new(),
        }
    }

    /// Add `id` to `category`. Adding an existing member is a no-op.
    pub fn insert(&mut self, category: K, id: EntityId) {
        let members = self.sets.entry(category).or_default();
        if !members.contains(&id) {
            members.push(id);
        }
    }

    /// Remove `id` from one category. Returns whether it was a member.
    pub fn remove(&mut self, category: K, id: EntityId) -> bool {
        let Some(members) = self.sets.get_mut(&category) else {
            return false;
        };
        match members.iter().position(|m| *m == id) {
            Some(pos) => {
                members.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Remove `id` from every category. Returns how many sets held it.
    pub fn remove_everywhere(&mut self, id: EntityId) -> usize {
        let mut removed = 0;
        for members in self.sets.values_mut() {
            if let Some(pos) = members.iter().position(|m| *m == id) {
                members.remove(pos);
                removed += 1;
            }
        }
        removed
    }

    /// Members of `category` in insertion order.
    pub fn members(&self, category: K) -> &[EntityId] {
        self.sets.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `id` belongs to `category`.
    pub fn contains(&self, category: K, id: EntityId) -> bool {
        self.members(category).contains(&id)
    }

    /// Number of members in `category`.
    pub fn count(&self, category: K) -> usize {
        self.members(category).len()
    }
}

impl<K: Ord + Copy> Default for CategoryIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Group {
        Obstacle,
        Active,
        Coin,
    }

    #[test]
    fn members_keep_insertion_order() {
        let mut index = CategoryIndex::new();
        let a = EntityId::new(3, 0);
        let b = EntityId::new(1, 0);
        let c = EntityId::new(2, 0);
        index.insert(Group::Obstacle, a);
        index.insert(Group::Obstacle, b);
        index.insert(Group::Obstacle, c);
        assert_eq!(index.members(Group::Obstacle), &[a, b, c]);
    }

    #[test]
    fn insert_is_idempotent() {
        let mut index = CategoryIndex::new();
        let a = EntityId::new(0, 0);
        index.insert(Group::Coin, a);
        index.insert(Group::Coin, a);
        assert_eq!(index.count(Group::Coin), 1);
    }

    #[test]
    fn remove_everywhere_clears_all_memberships() {
        let mut index = CategoryIndex::new();
        let crate_box = EntityId::new(0, 0);
        let ground = EntityId::new(1, 0);
        index.insert(Group::Obstacle, crate_box);
        index.insert(Group::Active, crate_box);
        index.insert(Group::Obstacle, ground);

        assert!(index.contains(Group::Active, crate_box));
        assert_eq!(index.remove_everywhere(crate_box), 2);
        assert_eq!(index.members(Group::Obstacle), &[ground]);
        assert!(index.members(Group::Active).is_empty());
    }

    #[test]
    fn unknown_category_is_empty() {
        let index: CategoryIndex<Group> = CategoryIndex::new();
        assert!(index.members(Group::Coin).is_empty());
        assert!(!index.contains(Group::Coin, EntityId::new(0, 0)));
    }

    #[test]
    fn remove_single_membership() {
        let mut index = CategoryIndex::new();
        let a = EntityId::new(0, 0);
        index.insert(Group::Active, a);
        index.insert(Group::Obstacle, a);
        assert!(index.remove(Group::Active, a));
        assert!(!index.remove(Group::Active, a));
        assert!(index.contains(Group::Obstacle, a));
    }
}
