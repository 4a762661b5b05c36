//! Quiver - a two-player archery arena
//!
//! Core modules:
//! - `sim`: Scene graph, commands, collisions and the per-tick world loop
//! - `assets`: Texture ids and the opaque handle registry
//! - `audio`: Sound effects and the spatial sound player
//! - `render`: Render target seam and a recording draw list
//! - `input`: Per-tick player input
//! - `settings`: Data-driven tuning loaded from JSON

pub mod assets;
pub mod audio;
pub mod error;
pub mod input;
pub mod render;
pub mod settings;
pub mod sim;

pub use error::{AssetError, ConfigError, SceneError, WorldError};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Size of one map tile in pixels
    pub const TILE_SIZE: f32 = 32.0;
    /// Map grid dimensions
    pub const MAP_ROWS: usize = 18;
    pub const MAP_COLS: usize = 24;
    /// World dimensions derived from the grid
    pub const WORLD_WIDTH: f32 = MAP_COLS as f32 * TILE_SIZE;
    pub const WORLD_HEIGHT: f32 = MAP_ROWS as f32 * TILE_SIZE;

    /// Character hitbox (distinct from the 48x32 sprite frame)
    pub const HITBOX_WIDTH: f32 = 40.0;
    pub const HITBOX_HEIGHT: f32 = 32.0;

    /// Arrow hitbox
    pub const ARROW_LENGTH: f32 = 32.0;
    pub const ARROW_THICKNESS: f32 = 8.0;

    /// Where an un-aimed marker is parked
    pub const MARKER_PARKED: (f32, f32) = (-1000.0, -1000.0);
}

/// Unit direction for an angle in degrees (screen space, y down)
#[inline]
pub fn direction_from_degrees(degrees: f32) -> Vec2 {
    let radians = degrees.to_radians();
    Vec2::new(radians.cos(), radians.sin())
}

/// Angle in degrees of a direction vector (screen space, y down)
#[inline]
pub fn degrees_from_direction(dir: Vec2) -> f32 {
    dir.y.atan2(dir.x).to_degrees()
}
