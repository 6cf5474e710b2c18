//! Walking enemies.
//!
//! Both enemy kinds share one [`Walker`] body and differ only in how they
//! pick a heading each frame:
//!
//! - [`MoveStrategy::Patrol`] walks until something blocks it, then turns.
//! - [`MoveStrategy::Pursuit`] steers toward the player while the player is
//!   within range and never turns on walls.

use serde::{Deserialize, Serialize};

use crate::collision::CollisionWorld;
use crate::geometry::{Aabb, Vec2};

use super::{Behave, FrameContext};

/// How a walker chooses its heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveStrategy {
    Patrol,
    Pursuit,
}

/// Shared enemy body state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Walker {
    pub strategy: MoveStrategy,
    /// `1.0` walks right, `-1.0` walks left.
    direction: f64,
}

impl Walker {
    pub fn new(strategy: MoveStrategy) -> Self {
        Self {
            strategy,
            direction: 1.0,
        }
    }

    pub fn direction(&self) -> f64 {
        self.direction
    }

    pub fn facing_right(&self) -> bool {
        self.direction > 0.0
    }

    fn steer(&mut self, body: &Aabb, ctx: &FrameContext<'_>) {
        if self.strategy != MoveStrategy::Pursuit {
            return;
        }
        let dx = ctx.player_center.x - body.center().x;
        if dx.abs() > ctx.config.follow_range {
            return;
        }
        if dx > ctx.config.follow_dead_zone {
            self.direction = 1.0;
        } else if dx < -ctx.config.follow_dead_zone {
            self.direction = -1.0;
        }
    }
}

impl Behave for Walker {
    fn movement(
        &mut self,
        body: &mut Aabb,
        velocity: &mut Vec2,
        world: &mut CollisionWorld<'_>,
        ctx: &FrameContext<'_>,
    ) {
        self.steer(body, ctx);

        velocity.x = self.direction * ctx.config.enemy_speed;
        let blocked = world.move_horizontal(body, velocity.x, ctx.self_id, false);
        if blocked && self.strategy == MoveStrategy::Patrol {
            self.direction = -self.direction;
        }

        world.fall(body, &mut velocity.y, ctx.config.gravity, ctx.self_id);
    }

    fn animate(&mut self, _ctx: &FrameContext<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::entities::Entity;
    use crate::map::TileKind;
    use gabe_world::Arena;

    fn ctx(config: &PhysicsConfig, player_x: f64) -> FrameContext<'_> {
        FrameContext {
            now_ms: 0,
            player_center: Vec2::new(player_x, 32.0),
            self_id: None,
            config,
        }
    }

    #[test]
    fn patrol_turns_at_walls() {
        let config = PhysicsConfig::default();
        let mut arena = Arena::new();
        let (wall, _) = Entity::from_tile(TileKind::Ground, Vec2::new(130.0, 0.0));
        let obstacles = vec![arena.insert(wall)];
        let mut world = CollisionWorld::new(&mut arena, &obstacles);

        let mut walker = Walker::new(MoveStrategy::Patrol);
        let mut body = Aabb::new(66.0, 0.0, 64.0, 64.0);
        let mut velocity = Vec2::ZERO;
        walker.movement(&mut body, &mut velocity, &mut world, &ctx(&config, 0.0));
        assert_eq!(body.right(), 130.0);
        assert!(!walker.facing_right());
    }

    #[test]
    fn pursuit_steers_toward_player_in_range() {
        let config = PhysicsConfig::default();
        let mut walker = Walker::new(MoveStrategy::Pursuit);
        let body = Aabb::new(300.0, 0.0, 64.0, 64.0);

        walker.steer(&body, &ctx(&config, 100.0));
        assert_eq!(walker.direction(), -1.0);

        // Inside the dead zone the heading is held.
        walker.steer(&body, &ctx(&config, 337.0));
        assert_eq!(walker.direction(), -1.0);

        // Out of range the heading is held as well.
        walker.steer(&body, &ctx(&config, 900.0));
        assert_eq!(walker.direction(), -1.0);

        walker.steer(&body, &ctx(&config, 500.0));
        assert_eq!(walker.direction(), 1.0);
    }

    #[test]
    fn pursuit_does_not_turn_on_walls() {
        let config = PhysicsConfig::default();
        let mut arena = Arena::new();
        let (wall, _) = Entity::from_tile(TileKind::Ground, Vec2::new(130.0, 0.0));
        let obstacles = vec![arena.insert(wall)];
        let mut world = CollisionWorld::new(&mut arena, &obstacles);

        let mut walker = Walker::new(MoveStrategy::Pursuit);
        let mut body = Aabb::new(66.0, 0.0, 64.0, 64.0);
        let mut velocity = Vec2::ZERO;
        walker.movement(&mut body, &mut velocity, &mut world, &ctx(&config, 2000.0));
        assert!(walker.facing_right());
        assert_eq!(body.right(), 130.0);
    }
}
