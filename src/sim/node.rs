//! Scene graph: arena-backed tree of entities
//!
//! Nodes live in a slot map and refer to each other by `NodeId`. Each node
//! owns its children (by id) and keeps a non-owning parent id used for
//! world-transform composition and detaching.
//!
//! Structural mutation during traversal: every traversal captures a node's
//! child count before descending, so children appended mid-visit are not
//! visited by that pass. Nodes spawned by the command drain are attached
//! before the update pass and step exactly once in their first tick.

use glam::{Affine2, Vec2};
use slotmap::{SecondaryMap, SlotMap, new_key_type};

use super::command::{ActionContext, Command, CommandQueue};
use super::entity::{Entity, Group, UpdateContext};
use super::event::GameEvent;
use super::transform::{Rect, Transform};
use super::Category;
use crate::error::SceneError;
use crate::render::RenderTarget;

new_key_type! {
    /// Stable handle to a scene node
    pub struct NodeId;
}

struct SceneNode {
    entity: Box<dyn Entity>,
    transform: Transform,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Mutable view of one node, handed to collision handlers
pub struct NodeMut<'a> {
    pub entity: &'a mut dyn Entity,
    pub transform: &'a mut Transform,
    pub parent_world: Affine2,
    /// World-space bounding rectangle, kept current by `move_world`
    pub bounds: Rect,
}

impl NodeMut<'_> {
    /// Move by an offset given in world space
    pub fn move_world(&mut self, offset: Vec2) {
        let local = self.parent_world.inverse().transform_vector2(offset);
        self.transform.translate(local);
        self.bounds.left += offset.x;
        self.bounds.top += offset.y;
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.bounds.left + self.bounds.width / 2.0,
            self.bounds.top + self.bounds.height / 2.0,
        )
    }
}

/// The scene graph
pub struct SceneGraph {
    nodes: SlotMap<NodeId, SceneNode>,
    root: NodeId,
    tick: u64,
    world_bounds: Rect,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Graph with a bare root node
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode {
            entity: Box::new(Group),
            transform: Transform::IDENTITY,
            parent: None,
            children: Vec::new(),
        });
        Self {
            nodes,
            root,
            tick: 0,
            world_bounds: Rect::new(0.0, 0.0, f32::MAX, f32::MAX),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn set_world_bounds(&mut self, bounds: Rect) {
        self.world_bounds = bounds;
    }

    pub fn world_bounds(&self) -> Rect {
        self.world_bounds
    }

    /// Start a new tick
    pub fn begin_tick(&mut self) {
        self.tick += 1;
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Number of live nodes, attached or not, including the root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    // ---------------------------------------------------------------
    // Structure
    // ---------------------------------------------------------------

    /// Create an unowned node
    pub fn insert(&mut self, entity: impl Entity, transform: Transform) -> NodeId {
        self.insert_boxed(Box::new(entity), transform)
    }

    pub fn insert_boxed(&mut self, entity: Box<dyn Entity>, transform: Transform) -> NodeId {
        self.nodes.insert(SceneNode {
            entity,
            transform,
            parent: None,
            children: Vec::new(),
        })
    }

    /// Create a node and attach it under `parent` in one step
    pub fn spawn(
        &mut self,
        parent: NodeId,
        entity: impl Entity,
        transform: Transform,
    ) -> Result<NodeId, SceneError> {
        let child = self.insert(entity, transform);
        if let Err(err) = self.attach_child(parent, child) {
            self.nodes.remove(child);
            return Err(err);
        }
        Ok(child)
    }

    /// Transfer ownership of an unowned node to `parent`, appended last
    pub fn attach_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if !self.contains(parent) || !self.contains(child) {
            return Err(SceneError::UnknownNode);
        }
        if child == self.root {
            return Err(SceneError::RootNode);
        }
        if self.nodes[child].parent.is_some() {
            return Err(SceneError::AlreadyAttached);
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(SceneError::WouldCycle);
        }

        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        Ok(())
    }

    /// Release `child` from `parent`; the node stays alive but unowned
    pub fn detach_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, SceneError> {
        let node = self.nodes.get_mut(parent).ok_or(SceneError::UnknownNode)?;
        let index = node
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or(SceneError::NotAChild)?;
        node.children.remove(index);
        self.nodes[child].parent = None;
        Ok(child)
    }

    /// Destroy a node and its whole subtree
    pub fn remove(&mut self, id: NodeId) -> Result<(), SceneError> {
        if id == self.root {
            return Err(SceneError::RootNode);
        }
        let parent = self.nodes.get(id).ok_or(SceneError::UnknownNode)?.parent;
        if let Some(parent) = parent {
            self.detach_child(parent, id)?;
        }
        for doomed in self.walk(id) {
            self.nodes.remove(doomed);
        }
        Ok(())
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.nodes.get(id).and_then(|n| n.parent) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    /// Pre-order ids of `id` and its descendants
    pub fn walk(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Attached nodes whose category intersects `mask`, in pre-order
    pub fn find(&self, mask: Category) -> Vec<NodeId> {
        self.walk(self.root)
            .into_iter()
            .filter(|&id| self.nodes[id].entity.category().intersects(mask))
            .collect()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    // ---------------------------------------------------------------
    // Access
    // ---------------------------------------------------------------

    pub fn entity(&self, id: NodeId) -> Option<&dyn Entity> {
        self.nodes.get(id).map(|n| n.entity.as_ref())
    }

    pub fn get<T: Entity>(&self, id: NodeId) -> Option<&T> {
        self.nodes.get(id).and_then(|n| n.entity.downcast_ref::<T>())
    }

    pub fn get_mut<T: Entity>(&mut self, id: NodeId) -> Option<&mut T> {
        self.nodes.get_mut(id).and_then(|n| n.entity.downcast_mut::<T>())
    }

    pub fn transform(&self, id: NodeId) -> Option<&Transform> {
        self.nodes.get(id).map(|n| &n.transform)
    }

    pub fn transform_mut(&mut self, id: NodeId) -> Option<&mut Transform> {
        self.nodes.get_mut(id).map(|n| &mut n.transform)
    }

    /// Composition of every local transform from the root down to `id`
    pub fn world_transform(&self, id: NodeId) -> Option<Affine2> {
        let mut node = self.nodes.get(id)?;
        let mut world = node.transform.to_affine();
        while let Some(parent) = node.parent {
            node = self.nodes.get(parent)?;
            world = node.transform.to_affine() * world;
        }
        Some(world)
    }

    fn parent_world(&self, id: NodeId) -> Affine2 {
        self.parent(id)
            .and_then(|parent| self.world_transform(parent))
            .unwrap_or(Affine2::IDENTITY)
    }

    /// World-space bounding rectangle; empty for nodes with no physical presence
    pub fn bound_rect(&self, id: NodeId) -> Rect {
        let Some(node) = self.nodes.get(id) else {
            return Rect::EMPTY;
        };
        let local = node.entity.local_bounds();
        if local.is_empty() {
            return Rect::EMPTY;
        }
        self.world_transform(id)
            .map(|world| local.transformed(&world))
            .unwrap_or(Rect::EMPTY)
    }

    /// World rectangles of every attached, non-transient node with physical presence
    pub fn bound_rects(&self) -> SecondaryMap<NodeId, Rect> {
        let mut rects = SecondaryMap::new();
        self.collect_rects(self.root, Affine2::IDENTITY, &mut rects);
        rects
    }

    fn collect_rects(&self, id: NodeId, parent_world: Affine2, rects: &mut SecondaryMap<NodeId, Rect>) {
        let node = &self.nodes[id];
        let world = parent_world * node.transform.to_affine();
        let local = node.entity.local_bounds();
        if !local.is_empty() && !node.entity.is_transient() {
            rects.insert(id, local.transformed(&world));
        }
        for &child in &node.children {
            self.collect_rects(child, world, rects);
        }
    }

    /// Borrow two distinct nodes mutably at once
    pub fn pair_mut(&mut self, a: NodeId, b: NodeId) -> Result<(NodeMut<'_>, NodeMut<'_>), SceneError> {
        let (world_a, world_b) = (self.parent_world(a), self.parent_world(b));
        let (bounds_a, bounds_b) = (self.bound_rect(a), self.bound_rect(b));
        let [node_a, node_b] = self
            .nodes
            .get_disjoint_mut([a, b])
            .ok_or(SceneError::UnknownNode)?;
        Ok((
            NodeMut {
                entity: &mut *node_a.entity,
                transform: &mut node_a.transform,
                parent_world: world_a,
                bounds: bounds_a,
            },
            NodeMut {
                entity: &mut *node_b.entity,
                transform: &mut node_b.transform,
                parent_world: world_b,
                bounds: bounds_b,
            },
        ))
    }

    // ---------------------------------------------------------------
    // Traversals
    // ---------------------------------------------------------------

    /// Depth-first pre-order update: own hook first, then children in order
    pub fn update(&mut self, dt: f32, commands: &mut CommandQueue, events: &mut Vec<GameEvent>) {
        self.update_node(self.root, Affine2::IDENTITY, dt, commands, events);
    }

    fn update_node(
        &mut self,
        id: NodeId,
        parent_world: Affine2,
        dt: f32,
        commands: &mut CommandQueue,
        events: &mut Vec<GameEvent>,
    ) {
        let world_bounds = self.world_bounds;
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };

        let SceneNode {
            entity, transform, ..
        } = &mut *node;
        let mut ctx = UpdateContext {
            dt,
            commands: &mut *commands,
            events: &mut *events,
            transform,
            parent_world,
            world_bounds,
        };
        entity.update(&mut ctx);

        let world = parent_world * node.transform.to_affine();
        let count = node.children.len();
        for index in 0..count {
            let Some(child) = self.nodes.get(id).and_then(|n| n.children.get(index).copied()) else {
                break;
            };
            self.update_node(child, world, dt, commands, events);
        }
    }

    /// Draw every attached node with its composed transform, children after owners
    pub fn draw(&self, target: &mut dyn RenderTarget) {
        self.draw_node(self.root, Affine2::IDENTITY, target);
    }

    fn draw_node(&self, id: NodeId, parent_world: Affine2, target: &mut dyn RenderTarget) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let world = parent_world * node.transform.to_affine();
        node.entity.draw(target, &world);
        for &child in &node.children {
            self.draw_node(child, world, target);
        }
    }

    /// Run `command` on every attached node whose category intersects its mask.
    ///
    /// Returns how many nodes it ran on. Children spawned by the action are
    /// appended to the target node and not visited by this dispatch.
    pub fn on_command(
        &mut self,
        command: &mut Command,
        dt: f32,
        queue: &mut CommandQueue,
    ) -> Result<usize, SceneError> {
        self.dispatch(self.root, Affine2::IDENTITY, command, dt, queue)
    }

    fn dispatch(
        &mut self,
        id: NodeId,
        parent_world: Affine2,
        command: &mut Command,
        dt: f32,
        queue: &mut CommandQueue,
    ) -> Result<usize, SceneError> {
        let mut hits = 0;
        let node = self.nodes.get_mut(id).ok_or(SceneError::UnknownNode)?;
        let count = node.children.len();

        let spawned = if node.entity.category().intersects(command.category()) {
            let SceneNode {
                entity, transform, ..
            } = &mut *node;
            let mut ctx = ActionContext::new(dt, &mut *queue, transform, parent_world);
            command.run(&mut **entity, &mut ctx)?;
            hits += 1;
            ctx.into_spawned()
        } else {
            Vec::new()
        };
        let world = parent_world * node.transform.to_affine();

        for (entity, transform) in spawned {
            let child = self.insert_boxed(entity, transform);
            self.attach_child(id, child)?;
        }

        for index in 0..count {
            let Some(child) = self.nodes.get(id).and_then(|n| n.children.get(index).copied()) else {
                break;
            };
            hits += self.dispatch(child, world, command, dt, queue)?;
        }
        Ok(hits)
    }

    /// Remove every attached node whose entity reports itself transient.
    ///
    /// Returns the number of nodes swept (subtrees count once).
    pub fn sweep_transient(&mut self) -> usize {
        let doomed: Vec<NodeId> = self
            .walk(self.root)
            .into_iter()
            .filter(|&id| self.nodes[id].entity.is_transient())
            .collect();

        let mut swept = 0;
        for id in doomed {
            if self.contains(id) && self.remove(id).is_ok() {
                swept += 1;
            }
        }
        if swept > 0 {
            log::debug!("Swept {} transient nodes", swept);
        }
        swept
    }
}
