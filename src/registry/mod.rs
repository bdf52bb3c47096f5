//! Registries for loaded tilesets, sprite sheets and tile definitions.
//!
//! This module provides:
//! - A unified `Registry` trait for named-item registries
//! - `TilesetRegistry` for tileset metadata
//! - `SheetStore` for sliced sheets with global and per-mod sprite indices
//! - `TileRegistry` for tile definitions with seasonal and mod-priority lookup

mod sheets;
mod tiles;
mod tilesets;
mod traits;

pub use sheets::SheetStore;
pub use tiles::TileRegistry;
pub use tilesets::TilesetRegistry;
pub use traits::Registry;
