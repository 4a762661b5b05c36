//! Local transforms and axis-aligned rectangles

use glam::{Affine2, Vec2};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (top-left origin, y down)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const EMPTY: Rect = Rect {
        left: 0.0,
        top: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// No area, so no physical presence
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Strict overlap: rectangles that only share an edge do not intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.left.max(other.left) < self.right().min(other.right())
            && self.top.max(other.top) < self.bottom().min(other.bottom())
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left && point.x < self.right() && point.y >= self.top && point.y < self.bottom()
    }

    /// Bounding box of this rectangle after an affine transform
    pub fn transformed(&self, transform: &Affine2) -> Rect {
        let corners = [
            Vec2::new(self.left, self.top),
            Vec2::new(self.right(), self.top),
            Vec2::new(self.left, self.bottom()),
            Vec2::new(self.right(), self.bottom()),
        ]
        .map(|c| transform.transform_point2(c));

        let min = corners.iter().fold(Vec2::splat(f32::INFINITY), |acc, c| acc.min(*c));
        let max = corners.iter().fold(Vec2::splat(f32::NEG_INFINITY), |acc, c| acc.max(*c));
        Rect::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    pub fn grown(&self, margin: f32) -> Rect {
        Rect::new(
            self.left - margin,
            self.top - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }
}

/// Local transform of a scene node
///
/// Composes as `translate(position) * rotate(rotation) * scale(scale) * translate(-origin)`,
/// so `origin` is the local point that sits at `position` and that rotation pivots around.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    /// Degrees, clockwise on screen
    pub rotation: f32,
    pub scale: Vec2,
    pub origin: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec2::ZERO,
        rotation: 0.0,
        scale: Vec2::ONE,
        origin: Vec2::ZERO,
    };

    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Translate by an offset in the parent's space
    pub fn translate(&mut self, offset: Vec2) {
        self.position += offset;
    }

    pub fn to_affine(&self) -> Affine2 {
        Affine2::from_translation(self.position)
            * Affine2::from_angle(self.rotation.to_radians())
            * Affine2::from_scale(self.scale)
            * Affine2::from_translation(-self.origin)
    }
}
