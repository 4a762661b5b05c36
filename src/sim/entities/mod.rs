//! Concrete entity kinds

pub mod animation;
pub mod arrow_holder;
pub mod backdrop;
pub mod character;
pub mod projectile;
pub mod visual_arrow;
pub mod wall;

pub use animation::FrameStrip;
pub use arrow_holder::ArrowHolder;
pub use backdrop::Backdrop;
pub use character::{AnimationState, Archetype, Character, CharacterTextures, CharacterTuning};
pub use projectile::Projectile;
pub use visual_arrow::VisualArrow;
pub use wall::{Wall, WallSet, WallTile};
