//! Gameplay events emitted during a tick
//!
//! The simulation never plays sounds itself; it reports what happened and the
//! world forwards these to the audio sink once the tick is done.

use glam::Vec2;

use crate::audio::SoundEffect;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// A fire request was accepted and a spawn command queued
    ArrowFired { player: u8, position: Vec2 },
    /// A live arrow struck a character
    PlayerKilled { player: u8, position: Vec2 },
    /// A spent arrow was collected
    ArrowRecovered { player: u8, position: Vec2 },
    PlayerJumped { player: u8, position: Vec2 },
    /// Touched down after at least one airborne tick
    PlayerLanded { player: u8, position: Vec2 },
    /// An arrow stuck into a wall
    ArrowEmbedded { position: Vec2 },
}

impl GameEvent {
    pub fn sound(&self) -> SoundEffect {
        match self {
            GameEvent::ArrowFired { .. } => SoundEffect::ArrowFire,
            GameEvent::PlayerKilled { .. } => SoundEffect::PlayerDeath,
            GameEvent::ArrowRecovered { .. } => SoundEffect::ArrowRecover,
            GameEvent::PlayerJumped { .. } => SoundEffect::PlayerJump,
            GameEvent::PlayerLanded { .. } => SoundEffect::PlayerLand,
            GameEvent::ArrowEmbedded { .. } => SoundEffect::ArrowHit,
        }
    }

    pub fn position(&self) -> Vec2 {
        match *self {
            GameEvent::ArrowFired { position, .. }
            | GameEvent::PlayerKilled { position, .. }
            | GameEvent::ArrowRecovered { position, .. }
            | GameEvent::PlayerJumped { position, .. }
            | GameEvent::PlayerLanded { position, .. }
            | GameEvent::ArrowEmbedded { position } => position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_and_wall_hit_sound_differently() {
        let at = Vec2::new(10.0, 20.0);
        let landed = GameEvent::PlayerLanded { player: 1, position: at };
        let embedded = GameEvent::ArrowEmbedded { position: at };
        assert_eq!(landed.sound(), SoundEffect::PlayerLand);
        assert_eq!(embedded.sound(), SoundEffect::ArrowHit);
        assert_eq!(landed.position(), embedded.position());
    }
}
