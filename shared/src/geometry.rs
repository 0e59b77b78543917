//! 2-D vectors and the axis-aligned rectangles every collision test runs on.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A point or direction in world coordinates. Serialized as `{"x":..,"y":..}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2D {
    pub x: f64,
    pub y: f64,
}

impl Vec2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2D {
    type Output = Vec2D;

    fn add(self, rhs: Vec2D) -> Vec2D {
        Vec2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2D {
    type Output = Vec2D;

    fn sub(self, rhs: Vec2D) -> Vec2D {
        Vec2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2D {
    type Output = Vec2D;

    fn mul(self, rhs: f64) -> Vec2D {
        Vec2D::new(self.x * rhs, self.y * rhs)
    }
}

/// An axis-aligned bounding rectangle. Never sent over the wire; rebuilt
/// from entity positions on whichever side needs collision tests.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Bounding box of the segment `p1`..`p2`, grown by `pad` on every side.
    pub fn around_segment(p1: Vec2D, p2: Vec2D, pad: f64) -> Self {
        let x_min = p1.x.min(p2.x);
        let y_min = p1.y.min(p2.y);
        Self {
            x: x_min - pad,
            y: y_min - pad,
            w: (p1.x - p2.x).abs() + 2.0 * pad,
            h: (p1.y - p2.y).abs() + 2.0 * pad,
        }
    }

    /// Square of half-extent `half` centered on `center`.
    pub fn around_point(center: Vec2D, half: f64) -> Self {
        Self {
            x: center.x - half,
            y: center.y - half,
            w: 2.0 * half,
            h: 2.0 * half,
        }
    }

    /// Strict-inequality overlap test: rectangles that merely touch along
    /// an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}
