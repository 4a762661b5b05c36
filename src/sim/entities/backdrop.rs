use glam::Affine2;

use crate::render::{RenderTarget, Sprite};
use crate::sim::entity::Entity;

/// Static background sprite covering the arena
#[derive(Debug, Clone)]
pub struct Backdrop {
    sprite: Sprite,
}

impl Backdrop {
    pub fn new(sprite: Sprite) -> Self {
        Self { sprite }
    }
}

impl Entity for Backdrop {
    fn draw(&self, target: &mut dyn RenderTarget, transform: &Affine2) {
        target.draw_sprite(&self.sprite, transform);
    }
}
