//! Arrows in flight, stuck in walls, or lying around to be picked up

use glam::{Affine2, Vec2};

use crate::assets::TextureHandle;
use crate::consts::{ARROW_LENGTH, ARROW_THICKNESS, TILE_SIZE};
use crate::render::{RenderTarget, Sprite};
use crate::sim::category::Category;
use crate::sim::entity::{Entity, UpdateContext};
use crate::sim::transform::Rect;
use crate::{degrees_from_direction, direction_from_degrees};

/// How far outside the world an arrow may fly before it is dropped
const EXPIRY_MARGIN: f32 = 2.0 * TILE_SIZE;

#[derive(Debug, Clone)]
pub struct Projectile {
    shooter: u8,
    velocity: Vec2,
    gravity: f32,
    /// Lethal while true; inert arrows can only be picked up
    collidable: bool,
    embedded: bool,
    picked_up: bool,
    expired: bool,
    sprite: Sprite,
}

impl Projectile {
    pub fn new(shooter: u8, rotation: f32, speed: f32, gravity: f32, texture: TextureHandle) -> Self {
        Self {
            shooter,
            velocity: direction_from_degrees(rotation) * speed,
            gravity,
            collidable: true,
            embedded: false,
            picked_up: false,
            expired: false,
            sprite: Sprite::new(texture, Rect::new(0.0, 0.0, ARROW_LENGTH, ARROW_THICKNESS)),
        }
    }

    pub fn shooter(&self) -> u8 {
        self.shooter
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    pub fn is_picked_up(&self) -> bool {
        self.picked_up
    }

    /// Hit a character: stop being lethal but keep flying
    pub fn strike(&mut self) {
        self.collidable = false;
    }

    /// Stick into a wall
    pub fn embed(&mut self) {
        self.velocity = Vec2::ZERO;
        self.embedded = true;
        self.collidable = false;
    }

    pub fn pick_up(&mut self) {
        self.picked_up = true;
    }
}

impl Entity for Projectile {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        if self.picked_up || self.embedded {
            return;
        }
        self.velocity.y += self.gravity * ctx.dt;
        if self.velocity != Vec2::ZERO {
            ctx.transform.rotation = degrees_from_direction(self.velocity);
        }
        ctx.move_world(self.velocity * ctx.dt);

        let bounds = self.local_bounds().transformed(&ctx.world_transform());
        if !ctx.world_bounds.grown(EXPIRY_MARGIN).intersects(&bounds) {
            log::debug!("Arrow from player {} left the arena", self.shooter);
            self.expired = true;
        }
    }

    fn draw(&self, target: &mut dyn RenderTarget, transform: &Affine2) {
        if !self.picked_up {
            target.draw_sprite(&self.sprite, transform);
        }
    }

    fn category(&self) -> Category {
        if self.collidable {
            Category::ARROW | Category::COLLIDABLE
        } else {
            Category::ARROW
        }
    }

    fn local_bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, ARROW_LENGTH, ARROW_THICKNESS)
    }

    fn collidable(&self) -> bool {
        self.collidable
    }

    fn is_transient(&self) -> bool {
        self.picked_up || self.expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::command::CommandQueue;
    use crate::sim::transform::Transform;

    fn fly(arrow: &mut Projectile, transform: &mut Transform, ticks: usize) {
        let mut commands = CommandQueue::new();
        let mut events = Vec::new();
        for _ in 0..ticks {
            let mut ctx = UpdateContext {
                dt: 1.0 / 60.0,
                commands: &mut commands,
                events: &mut events,
                transform: &mut *transform,
                parent_world: Affine2::IDENTITY,
                world_bounds: Rect::new(0.0, 0.0, 768.0, 576.0),
            };
            arrow.update(&mut ctx);
        }
    }

    #[test]
    fn test_flies_along_rotation_and_droops() {
        let mut arrow = Projectile::new(1, 0.0, 520.0, 120.0, TextureHandle::default());
        let mut transform = Transform::at(Vec2::new(100.0, 100.0));
        fly(&mut arrow, &mut transform, 30);
        assert!(transform.position.x > 300.0);
        assert!(transform.position.y > 100.0);
        assert!(transform.rotation > 0.0);
        assert!(!arrow.is_transient());
    }

    #[test]
    fn test_embedded_arrow_stays_put() {
        let mut arrow = Projectile::new(1, 90.0, 520.0, 120.0, TextureHandle::default());
        arrow.embed();
        let mut transform = Transform::at(Vec2::new(100.0, 100.0));
        fly(&mut arrow, &mut transform, 10);
        assert_eq!(transform.position, Vec2::new(100.0, 100.0));
        assert_eq!(arrow.category(), Category::ARROW);
    }

    #[test]
    fn test_expires_outside_world() {
        let mut arrow = Projectile::new(2, 180.0, 520.0, 0.0, TextureHandle::default());
        let mut transform = Transform::at(Vec2::new(10.0, 100.0));
        fly(&mut arrow, &mut transform, 30);
        assert!(arrow.is_transient());
    }

    #[test]
    fn test_strike_makes_arrow_inert() {
        let mut arrow = Projectile::new(1, 0.0, 520.0, 120.0, TextureHandle::default());
        assert!(arrow.category().contains(Category::COLLIDABLE));
        arrow.strike();
        assert!(!arrow.collidable());
        assert!(!arrow.is_transient());
        arrow.pick_up();
        assert!(arrow.is_transient());
    }
}
