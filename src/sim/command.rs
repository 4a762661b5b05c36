//! Category-targeted deferred commands
//!
//! A command pairs a category mask with an action bound to one concrete
//! entity type. Dispatch walks the whole graph and runs the action on every
//! node whose category intersects the mask.

use std::any::type_name;
use std::collections::VecDeque;
use std::fmt;

use glam::{Affine2, Vec2};

use super::category::Category;
use super::entity::Entity;
use super::transform::Transform;
use crate::error::SceneError;

/// What an action may touch besides its target entity
pub struct ActionContext<'a> {
    pub dt: f32,
    /// Pushes here are deferred to the next drain cycle
    pub commands: &'a mut CommandQueue,
    /// The target node's local transform
    pub transform: &'a mut Transform,
    parent_world: Affine2,
    spawned: Vec<(Box<dyn Entity>, Transform)>,
}

impl<'a> ActionContext<'a> {
    pub(crate) fn new(
        dt: f32,
        commands: &'a mut CommandQueue,
        transform: &'a mut Transform,
        parent_world: Affine2,
    ) -> Self {
        Self {
            dt,
            commands,
            transform,
            parent_world,
            spawned: Vec::new(),
        }
    }

    pub fn world_transform(&self) -> Affine2 {
        self.parent_world * self.transform.to_affine()
    }

    /// Append a new child to the target node once the action returns
    pub fn spawn_child(&mut self, entity: impl Entity, transform: Transform) {
        self.spawned.push((Box::new(entity), transform));
    }

    /// Like `spawn_child`, with `transform.position` given in world space
    pub fn spawn_child_at_world(&mut self, entity: impl Entity, mut transform: Transform) {
        transform.position = self.world_to_local(transform.position);
        self.spawn_child(entity, transform);
    }

    pub fn world_to_local(&self, point: Vec2) -> Vec2 {
        self.world_transform().inverse().transform_point2(point)
    }

    pub(crate) fn into_spawned(self) -> Vec<(Box<dyn Entity>, Transform)> {
        self.spawned
    }
}

type Action = Box<dyn FnMut(&mut dyn Entity, &mut ActionContext<'_>) -> Result<(), SceneError>>;

/// A deferred unit of behavior
pub struct Command {
    category: Category,
    target: &'static str,
    action: Action,
}

impl Command {
    /// Bind an action to entity type `T`.
    ///
    /// Dispatch to a node whose category matches but whose concrete type is
    /// not `T` fails with `SceneError::ActionTypeMismatch`.
    pub fn new<T, F>(category: Category, mut action: F) -> Self
    where
        T: Entity,
        F: FnMut(&mut T, &mut ActionContext<'_>) + 'static,
    {
        let expected = type_name::<T>();
        Self {
            category,
            target: expected,
            action: Box::new(move |entity, ctx| {
                let target = entity
                    .downcast_mut::<T>()
                    .ok_or(SceneError::ActionTypeMismatch { expected })?;
                action(target, ctx);
                Ok(())
            }),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn target_type(&self) -> &'static str {
        self.target
    }

    pub(crate) fn run(
        &mut self,
        entity: &mut dyn Entity,
        ctx: &mut ActionContext<'_>,
    ) -> Result<(), SceneError> {
        (self.action)(entity, ctx)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("category", &self.category)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// FIFO of pending commands
#[derive(Debug, Default)]
pub struct CommandQueue {
    queue: VecDeque<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.queue.push_back(command);
    }

    pub fn pop(&mut self) -> Option<Command> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Take everything queued so far, leaving the queue empty for
    /// commands produced while the batch is dispatched
    pub fn take_batch(&mut self) -> CommandQueue {
        CommandQueue {
            queue: std::mem::take(&mut self.queue),
        }
    }
}
