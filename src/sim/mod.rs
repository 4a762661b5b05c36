//! Simulation core
//!
//! Everything that decides what happens in a tick lives here:
//! - a slot-map backed scene graph with transform composition
//! - category-targeted commands
//! - collision discovery and category-based resolution
//! - the concrete entity kinds and the world that drives them
//!
//! Nothing in here touches a window, an audio device or the clock; time only
//! advances through the `dt` handed to `World::update`.

pub mod category;
pub mod collision;
pub mod command;
pub mod entities;
pub mod entity;
pub mod event;
pub mod map;
pub mod node;
pub mod resolve;
pub mod transform;
pub mod world;

pub use category::Category;
pub use collision::{BroadPhase, CollisionPair, PushOut, TreeWalk, minimal_push_out};
pub use command::{ActionContext, Command, CommandQueue};
pub use entity::{Entity, Group, UpdateContext};
pub use event::GameEvent;
pub use map::{Map, MapId};
pub use node::{NodeId, NodeMut, SceneGraph};
pub use resolve::{ResolutionTable, Rule};
pub use transform::{Rect, Transform};
pub use world::{Layer, World};
