//! Coins, pushable boxes, lucky blocks and the hearts they release.

use serde::{Deserialize, Serialize};

use crate::collision::CollisionWorld;
use crate::geometry::{Aabb, Vec2};

use super::{AnimationCursor, Behave, FrameContext};

const COIN_FRAMES: usize = 2;
const COIN_ANIMATION_SPEED: f64 = 0.05;

/// Frames a bumped lucky block spends bouncing.
pub const BOUNCE_FRAMES: u32 = 10;
/// Peak upward draw offset of a bouncing lucky block, in pixels.
pub const BOUNCE_HEIGHT: f64 = 12.0;

/// Frames a fresh heart spends rising out of its block.
pub const HEART_POP_FRAMES: u32 = 10;
const HEART_POP_SPEED: f64 = 3.0;
const HEART_FLOAT_AMPLITUDE: f64 = 4.0;
const HEART_FLOAT_RATE: f64 = 0.005;

// ---------------------------------------------------------------------------
// Coin
// ---------------------------------------------------------------------------

/// A spinning coin. Collected by contact; see the level's pickup pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Coin {
    pub animation: AnimationCursor,
}

impl Behave for Coin {
    fn movement(&mut self, _: &mut Aabb, _: &mut Vec2, _: &mut CollisionWorld<'_>, _: &FrameContext<'_>) {}

    fn animate(&mut self, _ctx: &FrameContext<'_>) {
        self.animation.advance(COIN_ANIMATION_SPEED, COIN_FRAMES);
    }
}

// ---------------------------------------------------------------------------
// PushBox
// ---------------------------------------------------------------------------

/// A crate that falls under gravity and can be shoved sideways by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PushBox;

impl Behave for PushBox {
    fn movement(
        &mut self,
        body: &mut Aabb,
        velocity: &mut Vec2,
        world: &mut CollisionWorld<'_>,
        ctx: &FrameContext<'_>,
    ) {
        world.fall(body, &mut velocity.y, ctx.config.gravity, ctx.self_id);
    }

    fn animate(&mut self, _ctx: &FrameContext<'_>) {}
}

// ---------------------------------------------------------------------------
// LuckyBlock
// ---------------------------------------------------------------------------

/// A block that releases one heart the first time it is hit from below.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LuckyBlock {
    spent: bool,
    bounce: Option<u32>,
}

impl LuckyBlock {
    /// Register a hit from below.
    ///
    /// Returns `true` only for the first hit, which is the one that releases
    /// a heart. Later hits do nothing.
    pub fn hit(&mut self) -> bool {
        if self.spent {
            return false;
        }
        self.spent = true;
        self.bounce = Some(0);
        true
    }

    pub fn is_spent(&self) -> bool {
        self.spent
    }

    pub fn is_bouncing(&self) -> bool {
        self.bounce.is_some()
    }

    /// Vertical draw offset of the bounce. Never affects the collision box.
    pub fn draw_offset(&self) -> f64 {
        match self.bounce {
            Some(frame) => {
                let phase = f64::from(frame) / f64::from(BOUNCE_FRAMES);
                -BOUNCE_HEIGHT * (phase * std::f64::consts::PI).sin()
            }
            None => 0.0,
        }
    }
}

impl Behave for LuckyBlock {
    fn movement(&mut self, _: &mut Aabb, _: &mut Vec2, _: &mut CollisionWorld<'_>, _: &FrameContext<'_>) {}

    fn animate(&mut self, _ctx: &FrameContext<'_>) {
        if let Some(frame) = self.bounce {
            let next = frame + 1;
            self.bounce = (next < BOUNCE_FRAMES).then_some(next);
        }
    }
}

// ---------------------------------------------------------------------------
// Heart
// ---------------------------------------------------------------------------

/// A healing pickup: pops upward for a few frames, then bobs in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heart {
    popped_frames: u32,
    rest_y: f64,
}

impl Heart {
    pub fn new(spawn_y: f64) -> Self {
        Self {
            popped_frames: 0,
            rest_y: spawn_y,
        }
    }

    pub fn is_popping(&self) -> bool {
        self.popped_frames < HEART_POP_FRAMES
    }
}

impl Behave for Heart {
    fn movement(
        &mut self,
        body: &mut Aabb,
        _velocity: &mut Vec2,
        _world: &mut CollisionWorld<'_>,
        ctx: &FrameContext<'_>,
    ) {
        if self.is_popping() {
            body.y -= HEART_POP_SPEED;
            self.popped_frames += 1;
            if !self.is_popping() {
                self.rest_y = body.y;
            }
        } else {
            let phase = ctx.now_ms as f64 * HEART_FLOAT_RATE;
            body.y = self.rest_y + HEART_FLOAT_AMPLITUDE * phase.sin();
        }
    }

    fn animate(&mut self, _ctx: &FrameContext<'_>) {}
}
