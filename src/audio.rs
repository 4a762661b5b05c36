//! Sound effects and the spatial sound player
//!
//! Buffer decoding and the output device are external. The simulation only
//! asks for "play effect X (at position P)"; `SoundPlayer` turns that into a
//! playback record with the gain the listener would hear.

use glam::{Vec2, Vec3};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Round start jingle
    MenuStart,
    /// Spent arrow picked up
    ArrowRecover,
    /// Arrow released
    ArrowFire,
    /// Character jumped
    PlayerJump,
    /// Character hit by a live arrow
    PlayerDeath,
    /// Character touched down after being airborne
    PlayerLand,
    /// Arrow thudded into a wall
    ArrowHit,
    /// Character spawned
    PlayerReady,
}

/// Narrow playback interface the world talks to
pub trait AudioSink {
    /// Play at the listener position (non-spatial)
    fn play(&mut self, effect: SoundEffect);
    /// Play at a world position
    fn play_at(&mut self, effect: SoundEffect, position: Vec2);
}

/// Sink that drops everything
#[derive(Debug, Default)]
pub struct Silence;

impl AudioSink for Silence {
    fn play(&mut self, _effect: SoundEffect) {}
    fn play_at(&mut self, _effect: SoundEffect, _position: Vec2) {}
}

// Sound coordinate system, point of view of a player in front of the screen:
// X = left; Y = up; Z = back (out of the screen)
const LISTENER_Z: f32 = 300.0;
const ATTENUATION: f32 = 8.0;
const MIN_DISTANCE_2D: f32 = 200.0;

fn min_distance_3d() -> f32 {
    (MIN_DISTANCE_2D * MIN_DISTANCE_2D + LISTENER_Z * LISTENER_Z).sqrt()
}

/// A playback the player has started
#[derive(Debug, Clone, PartialEq)]
pub struct Playback {
    pub effect: SoundEffect,
    pub position: Vec2,
    /// Final gain after volume and distance attenuation (0.0 - 1.0)
    pub gain: f32,
}

/// Spatial sound player
#[derive(Debug)]
pub struct SoundPlayer {
    listener: Vec2,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
    playing: Vec<Playback>,
}

impl Default for SoundPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundPlayer {
    pub fn new() -> Self {
        Self {
            listener: Vec2::ZERO,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            playing: Vec::new(),
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn set_listener_position(&mut self, position: Vec2) {
        self.listener = position;
    }

    pub fn listener_position(&self) -> Vec2 {
        self.listener
    }

    /// Playbacks started since the last `remove_stopped_sounds`
    pub fn playing(&self) -> &[Playback] {
        &self.playing
    }

    /// Drop finished playbacks; playback is instantaneous here so that is all of them
    pub fn remove_stopped_sounds(&mut self) {
        self.playing.clear();
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Inverse-distance attenuation with a clamped minimum distance
    fn distance_factor(&self, position: Vec2) -> f32 {
        let source = Vec3::new(position.x, -position.y, 0.0);
        let listener = Vec3::new(self.listener.x, -self.listener.y, LISTENER_Z);
        let min_distance = min_distance_3d();
        let distance = source.distance(listener).max(min_distance);
        min_distance / (min_distance + ATTENUATION * (distance - min_distance))
    }
}

impl AudioSink for SoundPlayer {
    fn play(&mut self, effect: SoundEffect) {
        let position = self.listener;
        self.play_at(effect, position);
    }

    fn play_at(&mut self, effect: SoundEffect, position: Vec2) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        let gain = vol * self.distance_factor(position);
        log::trace!("play {:?} at {:?} gain {:.3}", effect, position, gain);
        self.playing.push(Playback {
            effect,
            position,
            gain,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_position_is_full_volume() {
        let mut player = SoundPlayer::new();
        player.set_master_volume(1.0);
        player.play(SoundEffect::ArrowFire);
        assert_eq!(player.playing().len(), 1);
        assert!((player.playing()[0].gain - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_distant_sounds_are_quieter() {
        let mut player = SoundPlayer::new();
        player.play_at(SoundEffect::PlayerDeath, Vec2::new(100.0, 0.0));
        player.play_at(SoundEffect::PlayerDeath, Vec2::new(700.0, 0.0));
        let near = player.playing()[0].gain;
        let far = player.playing()[1].gain;
        assert!(far < near);
    }

    #[test]
    fn test_muted_player_records_nothing() {
        let mut player = SoundPlayer::new();
        player.set_muted(true);
        player.play(SoundEffect::ArrowRecover);
        assert!(player.playing().is_empty());

        player.set_muted(false);
        player.play(SoundEffect::ArrowRecover);
        player.remove_stopped_sounds();
        assert!(player.playing().is_empty());
    }
}
