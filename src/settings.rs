//! Game settings and tuning
//!
//! Loaded from a JSON file; every field falls back to its default so a
//! partial file only overrides what it names.

use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Gameplay tuning and session options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Movement ===
    /// Downward acceleration for characters (pixels/s²)
    pub gravity: f32,
    /// Horizontal running speed (pixels/s)
    pub run_speed: f32,
    /// Initial upward speed of a jump (pixels/s)
    pub jump_speed: f32,
    /// Terminal fall speed (pixels/s)
    pub max_fall_speed: f32,

    // === Arrows ===
    /// Launch speed (pixels/s)
    pub arrow_speed: f32,
    /// Downward acceleration for arrows in flight (pixels/s²)
    pub arrow_gravity: f32,
    /// Seconds between shots
    pub fire_cooldown: f32,
    /// Arrows each character starts with
    pub starting_arrows: u32,

    // === Session ===
    pub spawn_player_one: Vec2,
    pub spawn_player_two: Vec2,
    /// Fixed seed for map selection (None = time based)
    pub seed: Option<u64>,
    /// Custom map file, replaces the built-in rotation
    pub map_path: Option<PathBuf>,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gravity: 900.0,
            run_speed: 160.0,
            jump_speed: 420.0,
            max_fall_speed: 600.0,

            arrow_speed: 640.0,
            arrow_gravity: 120.0,
            fire_cooldown: 0.1,
            starting_arrows: 4,

            spawn_player_one: Vec2::new(32.0, 64.0),
            spawn_player_two: Vec2::new(128.0, 64.0),
            seed: None,
            map_path: None,

            master_volume: 0.8,
            sfx_volume: 1.0,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from a path if one was given, otherwise defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                log::info!("Using default settings");
                Ok(Self::default())
            }
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "starting_arrows": 2, "seed": 7 }"#).unwrap();
        assert_eq!(settings.starting_arrows, 2);
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.fire_cooldown, Settings::default().fire_cooldown);
        assert_eq!(settings.spawn_player_one, Vec2::new(32.0, 64.0));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = Settings::from_json("{ starting_arrows: }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Settings::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
