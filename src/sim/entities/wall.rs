//! Static level geometry

use glam::Affine2;
use serde::{Deserialize, Serialize};

use crate::assets::{TextureHandle, TextureId, TextureProvider};
use crate::consts::TILE_SIZE;
use crate::error::AssetError;
use crate::render::{RenderTarget, Sprite};
use crate::sim::category::Category;
use crate::sim::entity::Entity;
use crate::sim::transform::Rect;

/// Cosmetic skin shared by every wall and the backdrop of one map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallSet {
    Purple,
    Green,
    Red,
    Orange,
}

impl WallSet {
    pub fn wall_texture(&self) -> TextureId {
        match self {
            WallSet::Purple => TextureId::PurpleWall,
            WallSet::Green => TextureId::GreenWall,
            WallSet::Red => TextureId::RedWall,
            WallSet::Orange => TextureId::OrangeWall,
        }
    }

    pub fn background_texture(&self) -> TextureId {
        match self {
            WallSet::Purple => TextureId::PurpleBg,
            WallSet::Green => TextureId::GreenBg,
            WallSet::Red => TextureId::RedBg,
            WallSet::Orange => TextureId::OrangeBg,
        }
    }
}

/// Kind of tile in a map cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WallTile {
    #[default]
    None,
    Block,
    Ledge,
}

impl WallTile {
    /// Column of the tile in the wall texture
    fn source(&self) -> Rect {
        let column = match self {
            WallTile::None | WallTile::Block => 0.0,
            WallTile::Ledge => 1.0,
        };
        Rect::new(column * TILE_SIZE, 0.0, TILE_SIZE, TILE_SIZE)
    }
}

#[derive(Debug, Clone)]
pub struct Wall {
    set: WallSet,
    tile: WallTile,
    sprite: Sprite,
}

impl Wall {
    pub fn new(set: WallSet, tile: WallTile, texture: TextureHandle) -> Self {
        Self {
            set,
            tile,
            sprite: Sprite::new(texture, tile.source()),
        }
    }

    pub fn load(set: WallSet, tile: WallTile, textures: &impl TextureProvider) -> Result<Self, AssetError> {
        Ok(Self::new(set, tile, textures.get(set.wall_texture())?))
    }

    pub fn set(&self) -> WallSet {
        self.set
    }

    pub fn tile(&self) -> WallTile {
        self.tile
    }
}

impl Entity for Wall {
    fn draw(&self, target: &mut dyn RenderTarget, transform: &Affine2) {
        target.draw_sprite(&self.sprite, transform);
    }

    fn category(&self) -> Category {
        Category::WALL | Category::COLLIDABLE
    }

    fn local_bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, TILE_SIZE, TILE_SIZE)
    }

    fn collidable(&self) -> bool {
        true
    }
}
