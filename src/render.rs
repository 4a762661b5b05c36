//! Render target seam
//!
//! Window and GPU management are external; entities submit sprites with a
//! fully composed transform and never inspect the result.

use glam::{Affine2, Vec2};

use crate::assets::TextureHandle;
use crate::sim::Rect;

/// A textured quad: which texture and which sub-rectangle of it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub texture: TextureHandle,
    /// Source rectangle in texture pixels
    pub source: Rect,
}

impl Sprite {
    pub fn new(texture: TextureHandle, source: Rect) -> Self {
        Self { texture, source }
    }
}

/// Accepts draw calls
pub trait RenderTarget {
    fn draw_sprite(&mut self, sprite: &Sprite, transform: &Affine2);
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub sprite: Sprite,
    pub transform: Affine2,
}

impl DrawCall {
    /// Where the sprite's top-left corner lands on screen
    pub fn origin(&self) -> Vec2 {
        self.transform.transform_point2(Vec2::ZERO)
    }
}

/// Render target that just records, in submission order
#[derive(Debug, Default)]
pub struct DrawList {
    pub calls: Vec<DrawCall>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

impl RenderTarget for DrawList {
    fn draw_sprite(&mut self, sprite: &Sprite, transform: &Affine2) {
        self.calls.push(DrawCall {
            sprite: *sprite,
            transform: *transform,
        });
    }
}
