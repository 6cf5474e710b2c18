//! Player-centred camera with edge clamping and a parallax background.

use crate::config::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
use crate::geometry::{Aabb, Vec2};
use crate::level::LevelSimulation;

/// Background scroll speed relative to the world.
pub const PARALLAX_FACTOR: f64 = 0.5;

/// Computes screen positions for one level. Never mutates the level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    viewport: Vec2,
    offset: Vec2,
}

impl Default for CameraView {
    fn default() -> Self {
        Self::new(Vec2::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT))
    }
}

impl CameraView {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            viewport,
            offset: Vec2::ZERO,
        }
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// World position of the screen's top-left corner.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Recentre on the level's player.
    pub fn follow(&mut self, level: &LevelSimulation) {
        self.offset = self.offset_for(level.player().body().center(), level.bounds());
    }

    /// Offset that centres `focus` inside a level of size `extent`.
    ///
    /// On each axis the offset is clamped so the view stays inside the level.
    /// A level smaller than the viewport is centred instead, which makes the
    /// offset negative.
    pub fn offset_for(&self, focus: Vec2, extent: Vec2) -> Vec2 {
        Vec2::new(
            axis_offset(focus.x, extent.x, self.viewport.x),
            axis_offset(focus.y, extent.y, self.viewport.y),
        )
    }

    /// Screen position of a world box's top-left corner.
    pub fn to_screen(&self, body: &Aabb) -> Vec2 {
        body.origin() - self.offset
    }

    /// The two x positions at which the background is drawn to tile it.
    pub fn parallax(&self) -> [f64; 2] {
        let x = (-(self.offset.x * PARALLAX_FACTOR)).rem_euclid(self.viewport.x);
        [x, x - self.viewport.x]
    }
}

fn axis_offset(focus: f64, extent: f64, viewport: f64) -> f64 {
    if extent > viewport {
        (focus - viewport / 2.0).clamp(0.0, extent - viewport)
    } else {
        (extent - viewport) / 2.0
    }
}
