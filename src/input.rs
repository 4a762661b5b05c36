//! Per-tick player input
//!
//! Keyboard/gamepad polling is external; whatever backs it produces one
//! `TickInput` per simulation tick.

use serde::{Deserialize, Serialize};

/// Directional 3x3 aim grid
///
/// `x`: 0 = center, 1 = left, 2 = right.
/// `y`: 0 = center, 1 = up, 2 = down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AimGrid {
    pub x: u8,
    pub y: u8,
}

impl AimGrid {
    pub const CENTER: AimGrid = AimGrid { x: 0, y: 0 };

    /// Out-of-range components collapse to center
    pub fn new(x: u8, y: u8) -> Self {
        Self {
            x: if x > 2 { 0 } else { x },
            y: if y > 2 { 0 } else { y },
        }
    }

    pub fn is_center(&self) -> bool {
        self.x == 0 && self.y == 0
    }
}

/// One player's controls for a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerInput {
    pub aim: AimGrid,
    /// Fire trigger held
    pub fire: bool,
    /// -1 left, 0 none, 1 right
    pub run: i8,
    pub jump: bool,
}

/// Input commands for a single tick, indexed by player slot - 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TickInput {
    pub players: [PlayerInput; 2],
}

impl TickInput {
    pub fn player(&self, slot: u8) -> PlayerInput {
        match slot {
            2 => self.players[1],
            _ => self.players[0],
        }
    }
}

/// Anything that can be polled once per tick
pub trait InputSource {
    fn poll(&mut self) -> TickInput;
}

/// Replays a fixed list of inputs, then idles
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: Vec<TickInput>,
    cursor: usize,
}

impl ScriptedInput {
    pub fn new(frames: Vec<TickInput>) -> Self {
        Self { frames, cursor: 0 }
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.frames.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> TickInput {
        let input = self.frames.get(self.cursor).copied().unwrap_or_default();
        self.cursor += 1;
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_aim_is_center() {
        assert!(AimGrid::new(3, 7).is_center());
        assert_eq!(AimGrid::new(2, 1), AimGrid { x: 2, y: 1 });
    }

    #[test]
    fn test_scripted_input_idles_after_script() {
        let fire = TickInput {
            players: [
                PlayerInput {
                    fire: true,
                    ..Default::default()
                },
                PlayerInput::default(),
            ],
        };
        let mut source = ScriptedInput::new(vec![fire]);
        assert!(source.poll().player(1).fire);
        assert!(source.is_finished());
        assert_eq!(source.poll(), TickInput::default());
    }
}
