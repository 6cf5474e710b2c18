//! Slot storage keyed by generational [`EntityId`]s.
//!
//! The [`Arena`] owns every value exactly once. Other structures (category
//! sets, push chains, bump lists) only ever hold handles into it, so removing
//! a value from the arena is the single point of teardown.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::entity::{EntityAllocator, EntityId};
use crate::WorldError;

/// Generational slot storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena<T> {
    allocator: EntityAllocator,
    slots: Vec<Option<T>>,
}

impl<T> Arena<T> {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            slots: Vec::new(),
        }
    }

    /// Store `value` and return its handle.
    pub fn insert(&mut self, value: T) -> EntityId {
        let id = self.allocator.allocate();
        let idx = id.index() as usize;
        if idx == self.slots.len() {
            self.slots.push(Some(value));
        } else {
            self.slots[idx] = Some(value);
        }
        id
    }

    /// Remove the value behind `id` and return it.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::StaleEntity`] if the handle is dead or stale.
    pub fn remove(&mut self, id: EntityId) -> Result<T, WorldError> {
        if !self.allocator.deallocate(id) {
            trace!(entity = %id, "remove of a dead handle");
            return Err(WorldError::StaleEntity { entity: id });
        }
        self.slots[id.index() as usize]
            .take()
            .ok_or(WorldError::StaleEntity { entity: id })
    }

    /// Shared access to a live value.
    pub fn get(&self, id: EntityId) -> Option<&T> {
        if !self.allocator.is_alive(id) {
            return None;
        }
        self.slots.get(id.index() as usize)?.as_ref()
    }

    /// Mutable access to a live value.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        if !self.allocator.is_alive(id) {
            return None;
        }
        self.slots.get_mut(id.index() as usize)?.as_mut()
    }

    /// Whether `id` currently refers to a stored value.
    pub fn contains(&self, id: EntityId) -> bool {
        self.allocator.is_alive(id)
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.allocator.alive_count()
    }

    /// Whether the arena holds no live values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate live values in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(move |(idx, slot)| {
            let value = slot.as_ref()?;
            let id = self.allocator.live_handle(idx as u32)?;
            Some((id, value))
        })
    }
}

impl<T> Default for Arena<T> {
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

    #[test]
    fn insert_then_get() {
        let mut arena = Arena::new();
        let a = arena.insert("ground");
        let b = arena.insert("coin");
        assert_eq!(arena.get(a), Some(&"ground"));
        assert_eq!(arena.get(b), Some(&"coin"));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn remove_returns_value_and_invalidates_handle() {
        let mut arena = Arena::new();
        let coin = arena.insert(7u32);
        assert_eq!(arena.remove(coin).unwrap(), 7);
        assert!(arena.get(coin).is_none());
        assert!(!arena.contains(coin));
        assert!(arena.is_empty());
    }

    #[test]
    fn removing_twice_is_a_stale_entity_error() {
        let mut arena = Arena::new();
        let coin = arena.insert(1u8);
        arena.remove(coin).unwrap();
        let err = arena.remove(coin).unwrap_err();
        assert!(matches!(err, WorldError::StaleEntity { entity } if entity == coin));
    }

    #[test]
    fn reused_slot_does_not_answer_old_handle() {
        let mut arena = Arena::new();
        let coin = arena.insert("coin");
        arena.remove(coin).unwrap();
        let heart = arena.insert("heart");
        assert_eq!(heart.index(), coin.index());
        assert_eq!(arena.get(coin), None);
        assert_eq!(arena.get(heart), Some(&"heart"));
    }

    #[test]
    fn iter_skips_removed_slots() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        let b = arena.insert(2);
        let c = arena.insert(3);
        arena.remove(b).unwrap();
        let seen: Vec<(EntityId, i32)> = arena.iter().map(|(id, v)| (id, *v)).collect();
        assert_eq!(seen, vec![(a, 1), (c, 3)]);
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut arena = Arena::new();
        let id = arena.insert(10);
        *arena.get_mut(id).unwrap() += 5;
        assert_eq!(arena.get(id), Some(&15));
    }
}
