//! Axis-separated collision resolution against the obstacle set.
//!
//! Movers are displaced one axis at a time. After each axis every obstacle the
//! mover strictly overlaps is resolved by snapping the mover's leading edge to
//! the obstacle's facing edge. Pushable obstacles are shoved first, which may
//! in turn shove further pushables (a push chain).
//!
//! The resolver never owns bodies; it borrows the level arena and the current
//! obstacle handles for the duration of one frame.

use gabe_world::{Arena, EntityId};

use crate::entities::Entity;
use crate::geometry::Aabb;

/// Result of a vertical pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerticalOutcome {
    /// The mover came to rest on top of an obstacle.
    pub grounded: bool,
    /// Obstacles the mover hit from below, in resolution order.
    pub bumped: Vec<EntityId>,
}

/// Collision resolver over one frame's obstacles.
pub struct CollisionWorld<'a> {
    entities: &'a mut Arena<Entity>,
    obstacles: &'a [EntityId],
}

impl<'a> CollisionWorld<'a> {
    pub fn new(entities: &'a mut Arena<Entity>, obstacles: &'a [EntityId]) -> Self {
        Self {
            entities,
            obstacles,
        }
    }

    /// Body of an obstacle as it is right now (pushes move boxes mid-frame).
    pub fn body_of(&self, id: EntityId) -> Option<Aabb> {
        self.entities.get(id).map(|e| e.body)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// Move `body` by `dx` and resolve against obstacles.
    ///
    /// `mover` is excluded from the obstacle set. When `pushes` is set,
    /// pushable obstacles in the way are moved by the same `dx` first.
    /// Returns `true` if the mover was stopped short.
    pub fn move_horizontal(
        &mut self,
        body: &mut Aabb,
        dx: f64,
        mover: Option<EntityId>,
        pushes: bool,
    ) -> bool {
        let mut chain: Vec<EntityId> = mover.into_iter().collect();
        self.slide(body, dx, &mut chain, pushes)
    }

    /// Apply `gravity` to `vy`, move by the result and resolve.
    pub fn fall(
        &mut self,
        body: &mut Aabb,
        vy: &mut f64,
        gravity: f64,
        mover: Option<EntityId>,
    ) -> VerticalOutcome {
        *vy += gravity;
        body.y += *vy;
        self.resolve_vertical(body, vy, mover)
    }

    /// Move by `dy` without gravity (ladders) and resolve.
    pub fn move_vertical(&mut self, body: &mut Aabb, dy: f64, mover: Option<EntityId>) -> VerticalOutcome {
        body.y += dy;
        let mut vy = dy;
        self.resolve_vertical(body, &mut vy, mover)
    }

    /// Resolve a body that may already overlap obstacles, e.g. at spawn.
    ///
    /// Without a direction of travel, the mover is placed on top of an
    /// obstacle when its center is above the obstacle's center, and below it
    /// otherwise.
    pub fn settle(&mut self, body: &mut Aabb, mover: Option<EntityId>) -> VerticalOutcome {
        let mut vy = 0.0;
        self.resolve_vertical(body, &mut vy, mover)
    }

    fn slide(&mut self, body: &mut Aabb, dx: f64, chain: &mut Vec<EntityId>, pushes: bool) -> bool {
        if dx == 0.0 {
            return false;
        }
        body.x += dx;

        let obstacles = self.obstacles;
        let mut blocked = false;
        for &id in obstacles {
            if chain.contains(&id) {
                continue;
            }
            let Some(obstacle) = self.entities.get(id) else {
                continue;
            };
            if !obstacle.body.overlaps(body) {
                continue;
            }
            if pushes && obstacle.is_pushable() {
                self.push(id, dx, chain);
            }
            let Some(after) = self.body_of(id) else {
                continue;
            };
            if !after.overlaps(body) {
                continue;
            }
            if dx > 0.0 {
                body.set_right(after.left());
            } else {
                body.set_left(after.right());
            }
            blocked = true;
        }
        blocked
    }

    fn push(&mut self, id: EntityId, dx: f64, chain: &mut Vec<EntityId>) {
        let Some(mut pushed) = self.body_of(id) else {
            return;
        };
        chain.push(id);
        let blocked = self.slide(&mut pushed, dx, chain, true);
        chain.pop();
        if let Some(entity) = self.entities.get_mut(id) {
            entity.body = pushed;
        }
        tracing::trace!(entity = %id, dx, blocked, "pushed");
    }

    fn resolve_vertical(&mut self, body: &mut Aabb, vy: &mut f64, mover: Option<EntityId>) -> VerticalOutcome {
        let mut outcome = VerticalOutcome::default();
        for &id in self.obstacles {
            if Some(id) == mover {
                continue;
            }
            let Some(obstacle) = self.entities.get(id) else {
                continue;
            };
            let solid = obstacle.body;
            if !solid.overlaps(body) {
                continue;
            }
            if *vy > 0.0 {
                body.set_bottom(solid.top());
                *vy = 0.0;
                outcome.grounded = true;
            } else if *vy < 0.0 {
                body.set_top(solid.bottom());
                *vy = 0.0;
                outcome.bumped.push(id);
            } else if body.center().y < solid.center().y {
                body.set_bottom(solid.top());
                outcome.grounded = true;
            } else {
                body.set_top(solid.bottom());
            }
        }
        outcome
    }
}
