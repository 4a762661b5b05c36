//! Shared entity contract
//!
//! A scene node owns exactly one `Entity`. The graph handles hierarchy,
//! transforms and traversal; the entity supplies behavior and physical shape.

use std::any::Any;

use glam::Affine2;

use super::category::Category;
use super::command::CommandQueue;
use super::event::GameEvent;
use super::transform::{Rect, Transform};
use crate::render::RenderTarget;

/// Upcast helper so entities can be downcast to their concrete type
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Everything a node's own update hook may touch
pub struct UpdateContext<'a> {
    pub dt: f32,
    /// Commands pushed here run in the next tick's drain
    pub commands: &'a mut CommandQueue,
    pub events: &'a mut Vec<GameEvent>,
    /// This node's local transform
    pub transform: &'a mut Transform,
    /// Composed transform of the owner chain
    pub parent_world: Affine2,
    /// Playable area in world coordinates
    pub world_bounds: Rect,
}

impl UpdateContext<'_> {
    pub fn world_transform(&self) -> Affine2 {
        self.parent_world * self.transform.to_affine()
    }

    /// Move by an offset given in world space
    pub fn move_world(&mut self, offset: glam::Vec2) {
        let local = self.parent_world.inverse().transform_vector2(offset);
        self.transform.translate(local);
    }
}

/// Polymorphic behavior of a scene node
pub trait Entity: AsAny + 'static {
    /// Per-tick behavior; children are updated by the graph afterwards
    fn update(&mut self, _ctx: &mut UpdateContext<'_>) {}

    /// Submit this node's own visuals; `transform` is already fully composed
    fn draw(&self, _target: &mut dyn RenderTarget, _transform: &Affine2) {}

    /// Role flags; neutral by default
    fn category(&self) -> Category {
        Category::empty()
    }

    /// Physical extent in node-local coordinates; empty means no presence
    fn local_bounds(&self) -> Rect {
        Rect::EMPTY
    }

    fn collidable(&self) -> bool {
        false
    }

    /// True once the node should be swept from the graph
    fn is_transient(&self) -> bool {
        false
    }
}

impl dyn Entity {
    pub fn downcast_ref<T: Entity>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Entity>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    pub fn is<T: Entity>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// Node with no behavior of its own: the root, layers and containers
#[derive(Debug, Default, Clone, Copy)]
pub struct Group;

impl Entity for Group {}
