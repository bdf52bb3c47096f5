//! Data models for tiles, sheets, tilesets and map cells

mod cell;
mod sprite;
mod tile;
mod tileset;

pub use cell::{CellError, CellSlot, CellSlotContent, MapCell, SlotCapacity};
pub use sprite::{SpriteId, SpriteRef, SpriteValue, WeightedSprite};
pub use tile::{Season, Tile, TileObject, TileSource, CORE_MOD};
pub use tileset::{SheetInfo, SheetSpec, TileInfo, Tileset, FALLBACK_SHEET};

/// A non-fatal problem found while loading content.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub message: String,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
