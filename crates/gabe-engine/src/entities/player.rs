//! The player character.
//!
//! Each frame the player reads input, moves horizontally (pushing boxes),
//! then vertically (gravity, or a constant climb speed on ladders), and
//! finally derives its animation status from the resulting velocity. Ladder
//! and water membership are decided by the level and handed in before the
//! update.

use gabe_world::EntityId;
use serde::{Deserialize, Serialize};

use crate::collision::CollisionWorld;
use crate::config::{PhysicsConfig, PLAYER_HEIGHT, PLAYER_WIDTH};
use crate::geometry::{Aabb, Vec2};
use crate::input::{Action, InputSource};

use super::AnimationCursor;

const ANIMATION_SPEED: f64 = 0.15;
const FLICKER_PERIOD_MS: u64 = 200;

/// Animation state, derived from velocity after movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerStatus {
    Idle,
    Walk,
    Jump,
    Fall,
    Climb,
}

impl PlayerStatus {
    /// Number of frames in this status's animation.
    pub fn frame_count(self) -> usize {
        match self {
            PlayerStatus::Idle | PlayerStatus::Walk | PlayerStatus::Climb => 2,
            PlayerStatus::Jump | PlayerStatus::Fall => 1,
        }
    }
}

/// Player state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    body: Aabb,
    velocity: Vec2,
    health: u32,
    status: PlayerStatus,
    facing_right: bool,
    on_ground: bool,
    hurt: bool,
    hurt_time_ms: u64,
    in_water: bool,
    climbing: bool,
    ladder_exit_ms: Option<u64>,
    animation: AnimationCursor,
}

impl Player {
    /// A fresh player with its top-left corner at `origin`.
    pub fn new(origin: Vec2, config: &PhysicsConfig) -> Self {
        Self {
            body: Aabb::new(origin.x, origin.y, PLAYER_WIDTH, PLAYER_HEIGHT),
            velocity: Vec2::ZERO,
            health: config.start_health,
            status: PlayerStatus::Idle,
            facing_right: true,
            on_ground: false,
            hurt: false,
            hurt_time_ms: 0,
            in_water: false,
            climbing: false,
            ladder_exit_ms: None,
            animation: AnimationCursor::default(),
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn body(&self) -> Aabb {
        self.body
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    pub fn facing_right(&self) -> bool {
        self.facing_right
    }

    pub fn on_ground(&self) -> bool {
        self.on_ground
    }

    pub fn is_hurt(&self) -> bool {
        self.hurt
    }

    pub fn in_water(&self) -> bool {
        self.in_water
    }

    pub fn is_climbing(&self) -> bool {
        self.climbing
    }

    pub fn animation_frame(&self) -> usize {
        self.animation.index()
    }

    // -- level-driven state ---------------------------------------------------

    pub fn set_in_water(&mut self, in_water: bool) {
        self.in_water = in_water;
    }

    pub fn set_climbing(&mut self, climbing: bool) {
        self.climbing = climbing;
    }

    /// Whether enough time has passed since jumping off a ladder to grab one
    /// again.
    pub fn ladder_ready(&self, now_ms: u64, config: &PhysicsConfig) -> bool {
        self.ladder_exit_ms
            .map_or(true, |t| now_ms.saturating_sub(t) >= config.ladder_cooldown_ms)
    }

    /// Place the body and resolve any spawn overlap.
    pub fn settle(&mut self, world: &mut CollisionWorld<'_>) {
        let outcome = world.settle(&mut self.body, None);
        self.on_ground = outcome.grounded;
    }

    /// Keep the horizontal position inside `[min_x, max_x]`.
    pub fn clamp_x(&mut self, min_x: f64, max_x: f64) {
        if self.body.left() < min_x {
            self.body.set_left(min_x);
        }
        if self.body.right() > max_x {
            self.body.set_right(max_x);
        }
    }

    /// Drop health to zero (fell out of the level).
    pub fn kill(&mut self) {
        self.health = 0;
    }

    // -- damage -------------------------------------------------------------

    /// Take one point of damage unless still inside the hurt window.
    pub fn get_damage(&mut self, now_ms: u64, config: &PhysicsConfig) {
        if self.hurt {
            return;
        }
        self.health = self.health.saturating_sub(1);
        self.hurt = true;
        self.hurt_time_ms = now_ms;
        self.velocity.y = config.knockback;
        tracing::debug!(health = self.health, now_ms, "player damaged");
    }

    /// End the hurt window once the cooldown has elapsed.
    pub fn refresh_hurt(&mut self, now_ms: u64, config: &PhysicsConfig) {
        if self.hurt && now_ms.saturating_sub(self.hurt_time_ms) >= config.hurt_cooldown_ms {
            self.hurt = false;
        }
    }

    /// Restore one point of health, capped at the starting amount.
    pub fn heal(&mut self, config: &PhysicsConfig) {
        self.health = (self.health + 1).min(config.start_health);
        tracing::debug!(health = self.health, "player healed");
    }

    /// Whether the sprite is drawn this instant. Off half the time while hurt.
    pub fn flicker_visible(&self, now_ms: u64) -> bool {
        !self.hurt || now_ms % FLICKER_PERIOD_MS >= FLICKER_PERIOD_MS / 2
    }

    // -- per-frame update -----------------------------------------------------

    /// Advance one frame. Returns the obstacles hit from below.
    pub fn update(
        &mut self,
        input: &dyn InputSource,
        world: &mut CollisionWorld<'_>,
        now_ms: u64,
        config: &PhysicsConfig,
    ) -> Vec<EntityId> {
        self.refresh_hurt(now_ms, config);
        let dir = self.read_input(input, now_ms, config);

        let speed = if self.in_water {
            config.water_speed
        } else if input.is_pressed(Action::Run) {
            config.run_speed
        } else {
            config.walk_speed
        };
        self.velocity.x = dir * speed;
        world.move_horizontal(&mut self.body, self.velocity.x, None, true);

        let outcome = if self.climbing {
            world.move_vertical(&mut self.body, self.velocity.y, None)
        } else {
            let gravity = if self.in_water {
                config.water_gravity
            } else {
                config.gravity
            };
            world.fall(&mut self.body, &mut self.velocity.y, gravity, None)
        };
        self.on_ground = outcome.grounded;

        self.update_status(config);
        self.animate();
        outcome.bumped
    }

    /// Apply held actions. Returns the horizontal direction (-1, 0 or 1).
    fn read_input(&mut self, input: &dyn InputSource, now_ms: u64, config: &PhysicsConfig) -> f64 {
        let dir = if input.is_pressed(Action::Right) {
            self.facing_right = true;
            1.0
        } else if input.is_pressed(Action::Left) {
            self.facing_right = false;
            -1.0
        } else {
            0.0
        };

        if input.is_pressed(Action::Jump) {
            if self.on_ground || self.climbing {
                if self.climbing {
                    self.climbing = false;
                    self.ladder_exit_ms = Some(now_ms);
                }
                self.velocity.y = config.jump_strength;
            } else if self.in_water {
                self.velocity.y = config.water_jump;
            }
        }

        if self.climbing {
            self.velocity.y = if input.is_pressed(Action::Up) {
                -config.climb_speed
            } else if input.is_pressed(Action::Down) {
                config.climb_speed
            } else {
                0.0
            };
        }
        dir
    }

    fn update_status(&mut self, config: &PhysicsConfig) {
        let status = if self.climbing {
            PlayerStatus::Climb
        } else if self.velocity.y < 0.0 {
            PlayerStatus::Jump
        } else if self.velocity.y > config.fall_threshold {
            PlayerStatus::Fall
        } else if self.velocity.x != 0.0 {
            PlayerStatus::Walk
        } else {
            PlayerStatus::Idle
        };
        if status != self.status {
            self.status = status;
            self.animation.reset();
        }
    }

    fn animate(&mut self) {
        if self.status == PlayerStatus::Climb && self.velocity.y == 0.0 {
            return;
        }
        self.animation.advance(ANIMATION_SPEED, self.status.frame_count());
    }
}
