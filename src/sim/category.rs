//! Semantic role flags
//!
//! Every entity reports a set of these. Commands target by intersection and
//! the collision resolution table classifies pairs with them.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct Category: u32 {
        const WALL = 1 << 0;
        const PLAYER_ONE = 1 << 1;
        const PLAYER_TWO = 1 << 2;
        const ARROW = 1 << 3;
        const VISUAL_ARROW = 1 << 4;
        const ARROW_SPAWNER = 1 << 5;
        const COLLIDABLE = 1 << 6;
        const IGNORES_WALL_COLLISION = 1 << 7;

        /// Either player
        const PLAYER = Self::PLAYER_ONE.bits() | Self::PLAYER_TWO.bits();
    }
}

impl Category {
    /// Player flag for a 1-based slot; anything but 2 is player one
    pub fn player(slot: u8) -> Self {
        match slot {
            2 => Category::PLAYER_TWO,
            _ => Category::PLAYER_ONE,
        }
    }
}
