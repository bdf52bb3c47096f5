//! Tile definition registry with mod-priority and seasonal lookup.

use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{Season, Tile};

#[derive(Debug, Default)]
struct TilesetTiles {
    /// Last registration wins.
    latest: HashMap<String, Arc<Tile>>,
    by_mod: HashMap<String, HashMap<String, Arc<Tile>>>,
}

/// Tiles indexed per tileset, by id and by contributing mod.
#[derive(Debug, Default)]
pub struct TileRegistry {
    tilesets: HashMap<String, TilesetTiles>,
}

impl TileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tile(&mut self, tileset: &str, tile: Tile) {
        let entry = self.tilesets.entry(tileset.to_string()).or_default();
        let tile = Arc::new(tile);
        entry
            .by_mod
            .entry(tile.mod_id.clone())
            .or_default()
            .insert(tile.tile_id.clone(), Arc::clone(&tile));
        entry.latest.insert(tile.tile_id.clone(), tile);
    }

    /// Unprioritized lookup: the most recently registered definition.
    pub fn get_tile(&self, tileset: &str, tile_id: &str) -> Option<&Tile> {
        self.tilesets.get(tileset)?.latest.get(tile_id).map(Arc::as_ref)
    }

    pub fn get_tile_from_mod(&self, tileset: &str, mod_id: &str, tile_id: &str) -> Option<&Tile> {
        self.tilesets.get(tileset)?.by_mod.get(mod_id)?.get(tile_id).map(Arc::as_ref)
    }

    /// First match among `preferred_mods` in order, then the unprioritized index.
    pub fn get_tile_with_priority(
        &self,
        tileset: &str,
        tile_id: &str,
        preferred_mods: &[String],
    ) -> Option<&Tile> {
        preferred_mods
            .iter()
            .find_map(|m| self.get_tile_from_mod(tileset, m, tile_id))
            .or_else(|| self.get_tile(tileset, tile_id))
    }

    /// Seasonal variant, then the base id, without mod priority.
    pub fn get_tile_with_season(&self, tileset: &str, tile_id: &str, season: Season) -> Option<&Tile> {
        self.get_tile(tileset, &season.variant_id(tile_id))
            .or_else(|| self.get_tile(tileset, tile_id))
    }

    /// Full lookup order:
    /// 1. seasonal id within each preferred mod
    /// 2. seasonal id unscoped
    /// 3. base id within each preferred mod
    /// 4. base id unscoped
    ///
    /// `None` means "use the ASCII fallback", not an error.
    pub fn get_tile_with_season_and_priority(
        &self,
        tileset: &str,
        tile_id: &str,
        season: Season,
        preferred_mods: &[String],
    ) -> Option<&Tile> {
        let seasonal = season.variant_id(tile_id);
        preferred_mods
            .iter()
            .find_map(|m| self.get_tile_from_mod(tileset, m, &seasonal))
            .or_else(|| self.get_tile(tileset, &seasonal))
            .or_else(|| self.get_tile_with_priority(tileset, tile_id, preferred_mods))
    }

    /// Mods that registered tiles, sorted.
    pub fn mods(&self, tileset: &str) -> Vec<&str> {
        let mut mods: Vec<&str> = self
            .tilesets
            .get(tileset)
            .map(|e| e.by_mod.keys().map(String::as_str).collect())
            .unwrap_or_default();
        mods.sort_unstable();
        mods
    }

    pub fn tile_count_for_mod(&self, tileset: &str, mod_id: &str) -> usize {
        self.tilesets
            .get(tileset)
            .and_then(|e| e.by_mod.get(mod_id))
            .map_or(0, HashMap::len)
    }

    /// Distinct tile ids in a tileset.
    pub fn len(&self, tileset: &str) -> usize {
        self.tilesets.get(tileset).map_or(0, |e| e.latest.len())
    }

    pub fn is_empty(&self, tileset: &str) -> bool {
        self.len(tileset) == 0
    }

    pub fn remove_tileset(&mut self, tileset: &str) {
        self.tilesets.remove(tileset);
    }
}
