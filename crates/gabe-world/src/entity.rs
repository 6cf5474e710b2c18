//! Entity handles and their allocation.
//!
//! An [`EntityId`] names a slot *index* plus the slot's *generation* at the
//! time the handle was issued. Freeing a slot bumps its generation, so a
//! handle to a picked-up coin can never be confused with whatever entity
//! later reuses that slot.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// A generational entity handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot this handle points at.
    #[inline]
    pub fn index(self) -> u32 {
        self.index
    }

    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({self})")
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

// ---------------------------------------------------------------------------
// EntityAllocator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Slot {
    generation: u32,
    live: bool,
}

/// Issues and retires [`EntityId`]s.
///
/// The most recently freed slot is reused first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityAllocator {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a handle, recycling a freed slot when one exists.
    pub fn allocate(&mut self) -> EntityId {
        self.live += 1;
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.live = true;
                EntityId::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    live: true,
                });
                EntityId::new(index, 0)
            }
        }
    }

    /// Retire `id`. Returns `false` if it was already dead or stale.
    pub fn deallocate(&mut self, id: EntityId) -> bool {
        let Some(slot) = self.slot_mut(id) else {
            return false;
        };
        slot.live = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        true
    }

    /// Whether `id` is the current handle of a live slot.
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.slots
            .get(id.index as usize)
            .is_some_and(|slot| slot.live && slot.generation == id.generation)
    }

    /// The current handle for slot `index`, if that slot is alive.
    pub fn live_handle(&self, index: u32) -> Option<EntityId> {
        let slot = self.slots.get(index as usize)?;
        slot.live.then_some(EntityId::new(index, slot.generation))
    }

    /// Slots ever created, live or free.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn alive_count(&self) -> usize {
        self.live
    }

    fn slot_mut(&mut self, id: EntityId) -> Option<&mut Slot> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.live && slot.generation == id.generation)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
