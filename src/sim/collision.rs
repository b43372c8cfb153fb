//! Overlap tests and screen bounds
//!
//! Everything in the world is an axis-aligned box; blasts are circles
//! tested against box centres.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Rect;
use crate::tuning::Tuning;

/// Fixed playfield dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
    /// Y of the ground line; everything standing rests its bottom edge here
    pub ground_y: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32, ground_y: f32) -> Self {
        Self {
            width,
            height,
            ground_y,
        }
    }

    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self::new(tuning.width, tuning.height, tuning.ground_y())
    }

    /// True once `rect` has fully left the screen grown by `padding` on every side
    pub fn is_outside(&self, rect: &Rect, padding: f32) -> bool {
        rect.x > self.width + padding
            || rect.right() < -padding
            || rect.y > self.height + padding
            || rect.bottom() < -padding
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::from_tuning(&Tuning::default())
    }
}

/// Strict AABB overlap (touching edges do not count)
#[inline]
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.width && a.x + a.width > b.x && a.y < b.y + b.height && a.y + a.height > b.y
}

/// True when `point` lies within `radius` of `center` (inclusive)
#[inline]
pub fn within_radius(point: Vec2, center: Vec2, radius: f32) -> bool {
    point.distance(center) <= radius
}
