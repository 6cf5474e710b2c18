//! Gabe World -- entity storage for the platformer simulation.
//!
//! Every simulated object of a level lives exactly once in an [`Arena`] and is
//! addressed by a generational [`EntityId`]. Gameplay categories (obstacles,
//! hazards, pickups, ...) are handle sets in a [`CategoryIndex`], so one body
//! can belong to several categories without being owned twice.
//!
//! # Quick Start
//!
//! ```
//! use gabe_world::prelude::*;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
//! enum Group { Obstacle, Coin }
//!
//! let mut arena = Arena::new();
//! let mut groups = CategoryIndex::new();
//!
//! let ground = arena.insert("ground");
//! let coin = arena.insert("coin");
//! groups.insert(Group::Obstacle, ground);
//! groups.insert(Group::Coin, coin);
//!
//! // Picking up the coin tears it down everywhere.
//! arena.remove(coin).unwrap();
//! groups.remove_everywhere(coin);
//! assert!(groups.members(Group::Coin).is_empty());
//! assert_eq!(arena.len(), 1);
//! ```

#![deny(unsafe_code)]

pub mod arena;
pub mod category;
pub mod entity;

pub use arena::Arena;
pub use category::CategoryIndex;
pub use entity::{EntityAllocator, EntityId};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by world storage operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The handle does not refer to a live entity (stale or never allocated).
    #[error("entity {entity:?} does not exist (stale or never allocated)")]
    StaleEntity {
        /// The offending handle.
        entity: EntityId,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::arena::Arena;
    pub use crate::category::CategoryIndex;
    pub use crate::entity::{EntityAllocator, EntityId};
    pub use crate::WorldError;
}
