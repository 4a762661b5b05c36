//! Aim marker shown next to a character
//!
//! Never collides. Its owner repositions it through `VISUAL_ARROW` commands
//! every time it aims; a parked marker sits far outside the arena.

use glam::{Affine2, Vec2};

use crate::assets::TextureHandle;
use crate::consts::{ARROW_LENGTH, MARKER_PARKED};
use crate::render::{RenderTarget, Sprite};
use crate::sim::category::Category;
use crate::sim::entity::Entity;
use crate::sim::transform::{Rect, Transform};

#[derive(Debug, Clone)]
pub struct VisualArrow {
    slot: u8,
    sprite: Sprite,
}

impl VisualArrow {
    pub fn new(slot: u8, texture: TextureHandle) -> Self {
        Self {
            slot,
            sprite: Sprite::new(texture, Rect::new(0.0, 0.0, ARROW_LENGTH, ARROW_LENGTH)),
        }
    }

    /// Initial transform: parked until the first aim
    pub fn parked() -> Transform {
        Transform::at(Vec2::from(MARKER_PARKED))
    }

    /// Player slot whose aim commands move this marker
    pub fn slot(&self) -> u8 {
        self.slot
    }

    pub fn aim(&self, transform: &mut Transform, position: Vec2, rotation: f32) {
        transform.position = position;
        transform.rotation = rotation;
    }
}

impl Entity for VisualArrow {
    fn draw(&self, target: &mut dyn RenderTarget, transform: &Affine2) {
        target.draw_sprite(&self.sprite, transform);
    }

    fn category(&self) -> Category {
        Category::VISUAL_ARROW
    }
}
