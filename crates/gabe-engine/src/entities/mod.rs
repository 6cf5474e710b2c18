//! Simulated objects and their behaviors.
//!
//! Every non-player object of a level is an [`Entity`]: a collision box, a
//! velocity, a [`EntityKind`] tag, and a [`Behavior`] strategy. Behaviors are
//! a closed set of variants that all implement [`Behave`]; the level drives
//! them without knowing which variant it holds. The player is special enough
//! (input, health, ladders, water) to live in its own type, see
//! [`player::Player`].

pub mod enemy;
pub mod player;
pub mod props;

use gabe_world::EntityId;
use serde::{Deserialize, Serialize};

use crate::collision::CollisionWorld;
use crate::config::{PhysicsConfig, TILE_SIZE};
use crate::geometry::{Aabb, Vec2};
use crate::map::TileKind;

use self::enemy::{MoveStrategy, Walker};
use self::props::{Coin, Heart, LuckyBlock, PushBox};

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// What an entity is, independent of which sets it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Ground,
    Hazard,
    Coin,
    Water,
    Exit,
    Enemy,
    Item,
    Ladder,
    Box,
    Start,
    LuckyBlock,
}

/// Handle sets maintained by the level. One entity may be in several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Blocks movement in the collision resolver.
    Obstacle,
    Hazard,
    Coin,
    Water,
    Exit,
    Enemy,
    /// Pickups that heal (hearts).
    Item,
    Ladder,
    /// Updated every frame.
    Active,
    /// Drawn every frame.
    Visible,
}

// ---------------------------------------------------------------------------
// Per-frame context
// ---------------------------------------------------------------------------

/// Read-only facts a behavior may consult during one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    /// Wall-clock time in milliseconds, injected by the caller.
    pub now_ms: u64,
    /// Player center at the start of the frame.
    pub player_center: Vec2,
    /// Handle of the entity being updated, excluded from its own collisions.
    pub self_id: Option<EntityId>,
    pub config: &'a PhysicsConfig,
}

/// The common capability of every behavior variant.
pub trait Behave {
    /// Advance position and velocity by one frame.
    fn movement(
        &mut self,
        body: &mut Aabb,
        velocity: &mut Vec2,
        world: &mut CollisionWorld<'_>,
        ctx: &FrameContext<'_>,
    );

    /// Advance purely visual state by one frame.
    fn animate(&mut self, ctx: &FrameContext<'_>);
}

// ---------------------------------------------------------------------------
// Animation cursor
// ---------------------------------------------------------------------------

/// Fractional frame counter over a looping animation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnimationCursor {
    frame: f64,
}

impl AnimationCursor {
    /// Step by `speed` frames, wrapping at `frame_count`.
    pub fn advance(&mut self, speed: f64, frame_count: usize) {
        self.frame += speed;
        if self.frame >= frame_count as f64 {
            self.frame = 0.0;
        }
    }

    pub fn reset(&mut self) {
        self.frame = 0.0;
    }

    /// Index of the frame to draw.
    pub fn index(&self) -> usize {
        self.frame as usize
    }
}

// ---------------------------------------------------------------------------
// Behavior
// ---------------------------------------------------------------------------

/// Behavior strategy of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    /// Tiles, exits, ladders, water, spikes, start flags.
    Static,
    Coin(Coin),
    PushBox(PushBox),
    Walker(Walker),
    LuckyBlock(LuckyBlock),
    Heart(Heart),
}

impl Behave for Behavior {
    fn movement(
        &mut self,
        body: &mut Aabb,
        velocity: &mut Vec2,
        world: &mut CollisionWorld<'_>,
        ctx: &FrameContext<'_>,
    ) {
        match self {
            Behavior::Static => {}
            Behavior::Coin(coin) => coin.movement(body, velocity, world, ctx),
            Behavior::PushBox(push_box) => push_box.movement(body, velocity, world, ctx),
            Behavior::Walker(walker) => walker.movement(body, velocity, world, ctx),
            Behavior::LuckyBlock(block) => block.movement(body, velocity, world, ctx),
            Behavior::Heart(heart) => heart.movement(body, velocity, world, ctx),
        }
    }

    fn animate(&mut self, ctx: &FrameContext<'_>) {
        match self {
            Behavior::Static => {}
            Behavior::Coin(coin) => coin.animate(ctx),
            Behavior::PushBox(push_box) => push_box.animate(ctx),
            Behavior::Walker(walker) => walker.animate(ctx),
            Behavior::LuckyBlock(block) => block.animate(ctx),
            Behavior::Heart(heart) => heart.animate(ctx),
        }
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A non-player object stored in the level arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub body: Aabb,
    pub velocity: Vec2,
    pub behavior: Behavior,
}

impl Entity {
    fn new(kind: EntityKind, origin: Vec2, behavior: Behavior) -> Self {
        Self {
            kind,
            body: Aabb::new(origin.x, origin.y, TILE_SIZE, TILE_SIZE),
            velocity: Vec2::ZERO,
            behavior,
        }
    }

    /// Build the entity a map cell describes, together with its categories.
    ///
    /// The start marker yields only its flag tile; the level creates the
    /// player itself.
    pub fn from_tile(kind: TileKind, origin: Vec2) -> (Self, &'static [Category]) {
        use Category::*;
        match kind {
            TileKind::Ground => (
                Self::new(EntityKind::Ground, origin, Behavior::Static),
                &[Visible, Obstacle],
            ),
            TileKind::Box => (
                Self::new(EntityKind::Box, origin, Behavior::PushBox(PushBox)),
                &[Visible, Active, Obstacle],
            ),
            TileKind::Coin => (
                Self::new(EntityKind::Coin, origin, Behavior::Coin(props::Coin::default())),
                &[Visible, Coin, Active],
            ),
            TileKind::Spikes => (
                Self::new(EntityKind::Hazard, origin, Behavior::Static),
                &[Visible, Hazard],
            ),
            TileKind::Water => (
                Self::new(EntityKind::Water, origin, Behavior::Static),
                &[Visible, Water],
            ),
            TileKind::Start => (
                Self::new(EntityKind::Start, origin, Behavior::Static),
                &[Visible],
            ),
            TileKind::Exit => (
                Self::new(EntityKind::Exit, origin, Behavior::Static),
                &[Visible, Exit],
            ),
            TileKind::PatrolEnemy => (
                Self::new(
                    EntityKind::Enemy,
                    origin,
                    Behavior::Walker(Walker::new(MoveStrategy::Patrol)),
                ),
                &[Visible, Active, Enemy],
            ),
            TileKind::FollowerEnemy => (
                Self::new(
                    EntityKind::Enemy,
                    origin,
                    Behavior::Walker(Walker::new(MoveStrategy::Pursuit)),
                ),
                &[Visible, Active, Enemy],
            ),
            TileKind::LuckyBlock => (
                Self::new(
                    EntityKind::LuckyBlock,
                    origin,
                    Behavior::LuckyBlock(LuckyBlock::default()),
                ),
                &[Visible, Active, Obstacle],
            ),
            TileKind::Ladder => (
                Self::new(EntityKind::Ladder, origin, Behavior::Static),
                &[Visible, Ladder],
            ),
        }
    }

    /// A heart popping out of the cell above `block`.
    pub fn heart_above(block: &Aabb) -> (Self, &'static [Category]) {
        let origin = Vec2::new(block.x, block.y - TILE_SIZE);
        (
            Self::new(EntityKind::Item, origin, Behavior::Heart(Heart::new(origin.y))),
            &[Category::Visible, Category::Active, Category::Item],
        )
    }

    /// Whether the resolver may shove this obstacle aside.
    pub fn is_pushable(&self) -> bool {
        matches!(self.behavior, Behavior::PushBox(_))
    }
}
