//! Texture identifiers and the handle registry
//!
//! Decoding and GPU upload live outside the simulation core. The core only
//! needs a stable, opaque handle per texture id to hand to the render target.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::AssetError;

/// Every texture the game loads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureId {
    BlueIdle,
    BlueRun,
    BlueJump,
    BlueDeath,
    PinkIdle,
    PinkRun,
    PinkJump,
    PinkDeath,
    PurpleWall,
    PurpleBg,
    GreenWall,
    GreenBg,
    RedWall,
    RedBg,
    OrangeWall,
    OrangeBg,
    Arrow,
}

impl TextureId {
    /// Default asset path for this texture
    pub fn default_path(&self) -> &'static str {
        match self {
            TextureId::BlueIdle => "assets/character/BlueIdle.png",
            TextureId::BlueRun => "assets/character/BlueRun.png",
            TextureId::BlueJump => "assets/character/BlueJump.png",
            TextureId::BlueDeath => "assets/character/BlueDeath.png",
            TextureId::PinkIdle => "assets/character/PinkIdle.png",
            TextureId::PinkRun => "assets/character/PinkRun.png",
            TextureId::PinkJump => "assets/character/PinkJump.png",
            TextureId::PinkDeath => "assets/character/PinkDeath.png",
            TextureId::PurpleWall => "assets/background/PurpleWall.png",
            TextureId::PurpleBg => "assets/background/PurpleBG.png",
            TextureId::GreenWall => "assets/background/GreenWall.png",
            TextureId::GreenBg => "assets/background/GreenBG.png",
            TextureId::RedWall => "assets/background/RedWall.png",
            TextureId::RedBg => "assets/background/RedBG.png",
            TextureId::OrangeWall => "assets/background/OrangeWall.png",
            TextureId::OrangeBg => "assets/background/OrangeBG.png",
            TextureId::Arrow => "assets/arrow/arrow.png",
        }
    }

    pub const ALL: [TextureId; 17] = [
        TextureId::BlueIdle,
        TextureId::BlueRun,
        TextureId::BlueJump,
        TextureId::BlueDeath,
        TextureId::PinkIdle,
        TextureId::PinkRun,
        TextureId::PinkJump,
        TextureId::PinkDeath,
        TextureId::PurpleWall,
        TextureId::PurpleBg,
        TextureId::GreenWall,
        TextureId::GreenBg,
        TextureId::RedWall,
        TextureId::RedBg,
        TextureId::OrangeWall,
        TextureId::OrangeBg,
        TextureId::Arrow,
    ];
}

/// Opaque texture handle; the core never looks inside
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TextureHandle(u32);

impl TextureHandle {
    pub fn raw(&self) -> u32 {
        self.0
    }
}

/// Narrow lookup interface used by entity construction
pub trait TextureProvider {
    fn get(&self, id: TextureId) -> Result<TextureHandle, AssetError>;
}

/// Registry mapping texture ids to handles and their source paths
#[derive(Debug, Default)]
pub struct TextureHolder {
    entries: HashMap<TextureId, (TextureHandle, String)>,
    next_handle: u32,
}

impl TextureHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Holder with every known texture registered at its default path
    pub fn with_defaults() -> Self {
        let mut holder = Self::new();
        for id in TextureId::ALL {
            holder.load(id, id.default_path());
        }
        holder
    }

    /// Register a texture; re-loading an id keeps its handle and updates the path
    pub fn load(&mut self, id: TextureId, path: impl Into<String>) -> TextureHandle {
        let path = path.into();
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.1 = path;
            return entry.0;
        }
        let handle = TextureHandle(self.next_handle);
        self.next_handle += 1;
        log::debug!("Registered texture {:?} -> {}", id, path);
        self.entries.insert(id, (handle, path));
        handle
    }

    /// Source path a texture was registered with
    pub fn path(&self, id: TextureId) -> Option<&str> {
        self.entries.get(&id).map(|(_, path)| path.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TextureProvider for TextureHolder {
    fn get(&self, id: TextureId) -> Result<TextureHandle, AssetError> {
        self.entries
            .get(&id)
            .map(|(handle, _)| *handle)
            .ok_or(AssetError::Missing(id))
    }
}
