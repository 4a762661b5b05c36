//! Collision discovery and wall push-out geometry
//!
//! Discovery is purely rectangle based: two attached nodes collide when both
//! have a non-empty world bounding rectangle and those rectangles overlap.
//! Pairs are unordered and each appears at most once per tick.

use std::collections::BTreeSet;

use glam::Vec2;
use slotmap::SecondaryMap;

use super::node::{NodeId, SceneGraph};
use super::transform::Rect;

/// Two distinct nodes whose bounds overlap, stored with the smaller id first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollisionPair(NodeId, NodeId);

impl CollisionPair {
    /// Canonical pair; `None` for a node paired with itself
    pub fn new(a: NodeId, b: NodeId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self(a, b)),
            std::cmp::Ordering::Greater => Some(Self(b, a)),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn first(&self) -> NodeId {
        self.0
    }

    pub fn second(&self) -> NodeId {
        self.1
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.0 == id || self.1 == id
    }

    /// The partner of `id`, if `id` is in this pair
    pub fn other(&self, id: NodeId) -> Option<NodeId> {
        if self.0 == id {
            Some(self.1)
        } else if self.1 == id {
            Some(self.0)
        } else {
            None
        }
    }
}

/// Strategy for enumerating overlapping pairs
pub trait BroadPhase {
    fn find_pairs(&mut self, graph: &SceneGraph) -> BTreeSet<CollisionPair>;
}

/// Exhaustive recursive walk of the tree against itself.
///
/// Quadratic in the number of nodes with physical presence; fine for a
/// couple of characters, a handful of arrows and the wall tiles.
#[derive(Debug, Default)]
pub struct TreeWalk {
    rects: SecondaryMap<NodeId, Rect>,
}

impl TreeWalk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test every node under `left` against `scene` and all its descendants
    fn check_scene_collision(
        &self,
        graph: &SceneGraph,
        left: NodeId,
        scene: NodeId,
        pairs: &mut BTreeSet<CollisionPair>,
    ) {
        self.check_node_collision(graph, left, scene, pairs);
        for &child in graph.children(scene) {
            self.check_scene_collision(graph, left, child, pairs);
        }
    }

    /// Test `left` and each of its descendants against the single node `right`
    fn check_node_collision(
        &self,
        graph: &SceneGraph,
        left: NodeId,
        right: NodeId,
        pairs: &mut BTreeSet<CollisionPair>,
    ) {
        if let (Some(a), Some(b)) = (self.rects.get(left), self.rects.get(right)) {
            if a.intersects(b) {
                pairs.extend(CollisionPair::new(left, right));
            }
        }
        for &child in graph.children(left) {
            self.check_node_collision(graph, child, right, pairs);
        }
    }
}

impl BroadPhase for TreeWalk {
    fn find_pairs(&mut self, graph: &SceneGraph) -> BTreeSet<CollisionPair> {
        self.rects = graph.bound_rects();
        let mut pairs = BTreeSet::new();
        let root = graph.root();
        self.check_scene_collision(graph, root, root, &mut pairs);
        log::trace!("{} collision pairs over {} bodies", pairs.len(), self.rects.len());
        pairs
    }
}

/// Shortest way out of a wall, in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PushOut {
    Up(f32),
    Down(f32),
    Left(f32),
    Right(f32),
}

impl PushOut {
    pub fn offset(&self) -> Vec2 {
        match *self {
            PushOut::Up(d) => Vec2::new(0.0, -d),
            PushOut::Down(d) => Vec2::new(0.0, d),
            PushOut::Left(d) => Vec2::new(-d, 0.0),
            PushOut::Right(d) => Vec2::new(d, 0.0),
        }
    }

    pub fn is_vertical(&self) -> bool {
        matches!(self, PushOut::Up(_) | PushOut::Down(_))
    }

    pub fn distance(&self) -> f32 {
        match *self {
            PushOut::Up(d) | PushOut::Down(d) | PushOut::Left(d) | PushOut::Right(d) => d,
        }
    }
}

/// Minimal-axis push-out of `body` from `wall`, `None` when they don't overlap.
///
/// Equal distances resolve in the order up, down, left, right.
pub fn minimal_push_out(body: &Rect, wall: &Rect) -> Option<PushOut> {
    if !body.intersects(wall) {
        return None;
    }
    let candidates = [
        PushOut::Up(body.bottom() - wall.top),
        PushOut::Down(wall.bottom() - body.top),
        PushOut::Left(body.right() - wall.left),
        PushOut::Right(wall.right() - body.left),
    ];
    candidates
        .into_iter()
        .reduce(|best, next| if next.distance() < best.distance() { next } else { best })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Entity, Group};
    use crate::sim::transform::Transform;
    use proptest::prelude::*;

    struct Body(Rect);

    impl Entity for Body {
        fn local_bounds(&self) -> Rect {
            self.0
        }
    }

    fn body(graph: &mut SceneGraph, parent: NodeId, x: f32, y: f32, w: f32, h: f32) -> NodeId {
        graph
            .spawn(parent, Body(Rect::new(0.0, 0.0, w, h)), Transform::at(Vec2::new(x, y)))
            .unwrap()
    }

    #[test]
    fn test_pair_is_unordered() {
        let mut graph = SceneGraph::new();
        let a = graph.insert(Group, Transform::IDENTITY);
        let b = graph.insert(Group, Transform::IDENTITY);
        assert_eq!(CollisionPair::new(a, b), CollisionPair::new(b, a));
        assert!(CollisionPair::new(a, a).is_none());
        let pair = CollisionPair::new(b, a).unwrap();
        assert_eq!(pair.other(a), Some(b));
        assert!(pair.contains(b));
    }

    #[test]
    fn test_finds_pairs_across_subtrees() {
        let mut graph = SceneGraph::new();
        let ground = graph.spawn(graph.root(), Group, Transform::IDENTITY).unwrap();
        let fore = graph
            .spawn(graph.root(), Group, Transform::at(Vec2::new(100.0, 0.0)))
            .unwrap();
        let wall = body(&mut graph, ground, 100.0, 0.0, 32.0, 32.0);
        let player = body(&mut graph, fore, 10.0, 10.0, 40.0, 32.0);
        let arrow = body(&mut graph, player, 0.0, 0.0, 32.0, 8.0);
        let far = body(&mut graph, ground, 500.0, 500.0, 32.0, 32.0);

        let pairs = TreeWalk::new().find_pairs(&graph);
        assert!(pairs.contains(&CollisionPair::new(wall, player).unwrap()));
        assert!(pairs.contains(&CollisionPair::new(wall, arrow).unwrap()));
        assert!(pairs.contains(&CollisionPair::new(player, arrow).unwrap()));
        assert!(pairs.iter().all(|p| !p.contains(far)));
        assert_eq!(pairs.len(), 3);
    }

    #[test]
    fn test_empty_bounds_never_collide() {
        let mut graph = SceneGraph::new();
        let layer = graph.spawn(graph.root(), Group, Transform::IDENTITY).unwrap();
        let a = body(&mut graph, layer, 0.0, 0.0, 32.0, 32.0);
        let flat = body(&mut graph, layer, 0.0, 0.0, 0.0, 32.0);

        let pairs = TreeWalk::new().find_pairs(&graph);
        assert!(pairs.is_empty(), "{pairs:?}");
        assert!(graph.contains(a) && graph.contains(flat));
    }

    #[test]
    fn test_push_out_left_edge_overlap() {
        // 2px into the wall's right edge, 30px of vertical overlap
        let wall = Rect::new(0.0, 0.0, 32.0, 32.0);
        let body = Rect::new(30.0, 2.0, 40.0, 32.0);
        let push = minimal_push_out(&body, &wall).unwrap();
        assert_eq!(push, PushOut::Right(2.0));
        assert_eq!(push.offset(), Vec2::new(2.0, 0.0));
        assert!(!push.is_vertical());
    }

    #[test]
    fn test_push_out_landing() {
        let wall = Rect::new(0.0, 100.0, 32.0, 32.0);
        let body = Rect::new(0.0, 70.0, 32.0, 32.0);
        assert_eq!(minimal_push_out(&body, &wall), Some(PushOut::Up(2.0)));
    }

    #[test]
    fn test_push_out_tie_prefers_vertical() {
        let wall = Rect::new(0.0, 0.0, 32.0, 32.0);
        let body = Rect::new(28.0, 28.0, 32.0, 32.0);
        assert_eq!(minimal_push_out(&body, &wall), Some(PushOut::Down(4.0)));
    }

    #[test]
    fn test_no_push_out_when_touching() {
        let wall = Rect::new(0.0, 0.0, 32.0, 32.0);
        let body = Rect::new(32.0, 0.0, 32.0, 32.0);
        assert!(minimal_push_out(&body, &wall).is_none());
    }

    proptest! {
        #[test]
        fn prop_pairs_are_unique_and_physical(
            boxes in prop::collection::vec((0.0f32..200.0, 0.0f32..200.0, 0.0f32..40.0, 0.0f32..40.0), 1..24)
        ) {
            let mut graph = SceneGraph::new();
            let layer = graph.spawn(graph.root(), Group, Transform::IDENTITY).unwrap();
            let mut parent = layer;
            for (i, &(x, y, w, h)) in boxes.iter().enumerate() {
                let id = body(&mut graph, parent, x, y, w, h);
                if i % 3 == 0 {
                    parent = id;
                }
            }

            let pairs = TreeWalk::new().find_pairs(&graph);
            for pair in &pairs {
                prop_assert!(pair.first() < pair.second());
                let a = graph.bound_rect(pair.first());
                let b = graph.bound_rect(pair.second());
                prop_assert!(!a.is_empty() && !b.is_empty());
                prop_assert!(a.intersects(&b));
            }
        }

        #[test]
        fn prop_push_out_separates(
            (wx, wy) in (0.0f32..100.0, 0.0f32..100.0),
            (bx, by) in (-30.0f32..130.0, -30.0f32..130.0),
        ) {
            let wall = Rect::new(wx, wy, 32.0, 32.0);
            let mut body = Rect::new(bx, by, 40.0, 32.0);
            if let Some(push) = minimal_push_out(&body, &wall) {
                let offset = push.offset();
                body.left += offset.x;
                body.top += offset.y;
                prop_assert!(!body.grown(-1e-3).intersects(&wall));
            }
        }
    }
}
