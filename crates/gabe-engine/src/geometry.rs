//! Axis-aligned boxes and 2D vectors in world pixels (y grows downwards).

use serde::{Deserialize, Serialize};

/// 2D vector in pixels (positions) or pixels per frame (velocities).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Axis-aligned bounding box given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Aabb {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn set_left(&mut self, left: f64) {
        self.x = left;
    }

    pub fn set_right(&mut self, right: f64) {
        self.x = right - self.w;
    }

    pub fn set_top(&mut self, top: f64) {
        self.y = top;
    }

    pub fn set_bottom(&mut self, bottom: f64) {
        self.y = bottom - self.h;
    }

    /// Strict overlap: boxes that only share an edge do not overlap.
    ///
    /// Used for solid collisions and area zones (water, ladders).
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Closed contact: overlapping or sharing an edge.
    ///
    /// Used for pickups, hazards and the exit, so a body standing on top of
    /// a tile is in contact with it.
    pub fn touches(&self, other: &Aabb) -> bool {
        self.left() <= other.right()
            && other.left() <= self.right()
            && self.top() <= other.bottom()
            && other.top() <= self.bottom()
    }
}
