//! Gabe Engine -- simulation core of a tile-based 2D platformer.
//!
//! A text map is parsed into a [`LevelMap`](map::LevelMap), instantiated as a
//! [`LevelSimulation`](level::LevelSimulation) whose bodies live in a
//! [`gabe_world::Arena`], and advanced one fixed frame at a time. Drawing and
//! input go through the [`Renderer`](render::Renderer) and
//! [`InputSource`](input::InputSource) seams, so the core runs headless.
//! A [`GameSession`](session::GameSession) strings levels together, and a
//! [`TickLoop`](tick::TickLoop) drives a session with a [`Clock`](clock::Clock).
//!
//! # Quick Start
//!
//! ```
//! use gabe_engine::prelude::*;
//!
//! let config = PhysicsConfig::default();
//! let mut level = LevelSimulation::load("level 1:\n1-----E\n", 1, &config).unwrap();
//!
//! let right = InputFrame::new().with(Action::Right);
//! let mut now_ms = 0;
//! while !level.is_complete() && now_ms < 10_000 {
//!     level.update(&right, now_ms);
//!     now_ms += 17;
//! }
//!
//! assert!(level.is_complete());
//! assert!(!level.is_game_over());
//! ```

#![deny(unsafe_code)]

pub mod camera;
pub mod clock;
pub mod collision;
pub mod config;
pub mod digest;
pub mod entities;
pub mod geometry;
pub mod input;
pub mod level;
pub mod map;
pub mod render;
pub mod replay;
pub mod session;
pub mod tick;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the storage crate for convenience.
pub use gabe_world;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use gabe_world::prelude::*;

    pub use crate::camera::CameraView;
    pub use crate::clock::{Clock, SteppedClock, SystemClock};
    pub use crate::config::{ConfigError, PhysicsConfig, TILE_SIZE};
    pub use crate::digest::state_hash;
    pub use crate::entities::player::{Player, PlayerStatus};
    pub use crate::entities::{Category, Entity, EntityKind};
    pub use crate::geometry::{Aabb, Vec2};
    pub use crate::input::{Action, InputFrame, InputSource};
    pub use crate::level::LevelSimulation;
    pub use crate::map::{Biome, LevelMap, MapError, SpawnSource, TileKind};
    pub use crate::render::{draw_level, Background, Renderer, Sprite, SpriteKind};
    pub use crate::replay::{
        replay, ReplayDivergence, ReplayEntry, ReplayLog, ReplayRecorder, ReplayResult,
    };
    pub use crate::session::{GameSession, MapSource, SessionSignal};
    pub use crate::tick::{TickConfig, TickDiagnostics, TickLoop};
}
