//! Tile resolution façade.
//!
//! [`TilesetService`] owns the three registries and answers the one
//! question the renderer asks: "what does object X look like in tileset T?"
//! Resolution never fails; an object without a tile resolves to its ASCII
//! fallback glyph.

use image::RgbaImage;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::loader::{
    decode_sheets, discover_tileset_dirs, find_gfx_dir, load_mod_tilesets, read_tileset, DecodedSheet,
    LoadError, LoadReport, ModTileset,
};
use crate::models::{Season, SheetInfo, SpriteId, Tile, TileObject, TileSource, Tileset, Warning, CORE_MOD};
use crate::registry::{Registry, SheetStore, TileRegistry, TilesetRegistry};
use crate::sheet::Sheet;

/// Size of the blank sprite used when even the fallback glyph is missing.
const BLANK_SPRITE_SIZE: u32 = 32;

/// Error for lookups that name a tileset explicitly.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ServiceError {
    #[error("Tileset not found: {0}")]
    TilesetNotFound(String),
    #[error("No tilesets available")]
    NoTilesetsAvailable,
}

/// Per-mod contribution to a tileset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModStats {
    pub sheets: usize,
    pub tiles: usize,
}

/// A tileset read and decoded off the main thread, waiting to be merged.
struct LoadedTileset {
    tileset: Tileset,
    warnings: Vec<Warning>,
    sheets: Vec<Result<DecodedSheet, LoadError>>,
}

fn load_tileset_dir(dir: &Path) -> Result<LoadedTileset, LoadError> {
    let (tileset, warnings) = read_tileset(dir)?;
    let sheets = decode_sheets(&tileset, &tileset.sheets, &tileset.root, CORE_MOD);
    Ok(LoadedTileset { tileset, warnings, sheets })
}

/// Collapse compound terminal color names: `light_*`/`dark_*` keep their
/// first two parts, anything else keeps only the first.
pub fn normalize_color(color: &str) -> String {
    let mut parts = color.split('_');
    let first = parts.next().unwrap_or_default();
    match (first, parts.next()) {
        ("light" | "dark", Some(second)) => format!("{}_{}", first, second),
        _ => first.to_string(),
    }
}

/// Registries for every loaded tileset plus the resolution logic over them.
#[derive(Debug, Default)]
pub struct TilesetService {
    tilesets: TilesetRegistry,
    sheets: SheetStore,
    tiles: TileRegistry,
}

impl TilesetService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every tileset under `<game>/gfx` and every mod tileset under
    /// `<game>/data/mods`, decoding on a pool of `jobs` worker threads.
    ///
    /// Registries are only touched on the calling thread.
    pub fn load(game_path: &Path, jobs: usize) -> Result<(Self, LoadReport), LoadError> {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs.max(1)).build()?;
        let dirs = discover_tileset_dirs(&find_gfx_dir(game_path))?;

        let loaded: Vec<_> = pool.install(|| dirs.par_iter().map(|dir| (dir, load_tileset_dir(dir))).collect());

        let mut service = Self::new();
        let mut report = LoadReport::default();
        for (dir, result) in loaded {
            match result {
                Ok(tileset) => service.merge_tileset(tileset, &mut report),
                Err(e) => report.warn(format!("Skipping tileset {}: {}", dir.display(), e)),
            }
        }

        let (mod_tilesets, warnings) = pool.install(|| load_mod_tilesets(game_path))?;
        report.extend_warnings(warnings);
        pool.install(|| service.apply_mod_tilesets(&mod_tilesets, &mut report));

        Ok((service, report))
    }

    /// Load a single tileset directory on the current rayon pool.
    pub fn add_tileset_dir(&mut self, dir: &Path) -> Result<LoadReport, LoadError> {
        let mut report = LoadReport::default();
        let loaded = load_tileset_dir(dir)?;
        self.merge_tileset(loaded, &mut report);
        Ok(report)
    }

    fn merge_tileset(&mut self, loaded: LoadedTileset, report: &mut LoadReport) {
        report.extend_warnings(loaded.warnings);
        let name = loaded.tileset.folder_name.clone();
        self.tilesets.register(loaded.tileset);

        for result in loaded.sheets {
            match result {
                Ok(decoded) => self.register_decoded(&name, decoded, report),
                Err(e) => report.warn(format!("Skipping sheet in tileset '{}': {}", name, e)),
            }
        }
        self.ensure_fallback(&name);
        self.sheets.finalize_tileset(&name);
        report.tilesets += 1;

        tracing::info!(
            "Loaded tileset '{}': {} sheets, {} sprites, {} tiles",
            name,
            self.sheets.sheet_count(&name),
            self.sheets.sprite_count(&name),
            self.tiles.len(&name)
        );
    }

    fn register_decoded(&mut self, tileset: &str, decoded: DecodedSheet, report: &mut LoadReport) {
        report.extend_warnings(decoded.warnings);
        if !decoded.sheet.is_fallback() {
            for tile in decoded.tiles {
                self.tiles.add_tile(tileset, tile);
                report.tiles += 1;
            }
        }
        self.sheets.add_sheet(tileset, decoded.sheet);
        report.sheets += 1;
    }

    fn ensure_fallback(&mut self, tileset: &str) {
        if self.sheets.fallback_sheet(tileset).is_none() {
            tracing::debug!("Tileset '{}' has no fallback sheet, using the default", tileset);
            self.sheets.add_sheet(tileset, Sheet::default_fallback(BLANK_SPRITE_SIZE, BLANK_SPRITE_SIZE));
        }
    }

    /// Merge mod tileset extensions into their compatible base tilesets.
    ///
    /// Sheets decode on the current rayon pool; every touched tileset is
    /// re-finalized afterwards.
    pub fn apply_mod_tilesets(&mut self, mod_tilesets: &[ModTileset], report: &mut LoadReport) {
        let mut jobs: Vec<(String, &ModTileset)> = Vec::new();
        let mut warned_mods = HashSet::new();

        for mod_tileset in mod_tilesets {
            let mut unresolved = Vec::new();
            let mut renamed = Vec::new();
            for name in &mod_tileset.compatibility {
                match self.tilesets.resolve_name(name) {
                    Some(folder) => {
                        if folder != name {
                            renamed.push(format!("{} -> {}", name, folder));
                        }
                        let folder = folder.to_string();
                        if !jobs.iter().any(|(ts, m)| *ts == folder && std::ptr::eq(*m, mod_tileset)) {
                            jobs.push((folder, mod_tileset));
                        }
                    }
                    None => unresolved.push(name.as_str()),
                }
            }

            if (!unresolved.is_empty() || !renamed.is_empty()) && warned_mods.insert(mod_tileset.mod_id.clone()) {
                if !unresolved.is_empty() {
                    report.warn(format!(
                        "Mod '{}' targets unknown tilesets: {}",
                        mod_tileset.mod_id,
                        unresolved.join(", ")
                    ));
                }
                if !renamed.is_empty() {
                    tracing::warn!("Mod '{}' tileset names resolved by short name: {}", mod_tileset.mod_id, renamed.join(", "));
                }
            }
        }

        let tilesets = &self.tilesets;
        let decoded: Vec<(String, String, Vec<Result<DecodedSheet, LoadError>>)> = jobs
            .par_iter()
            .filter_map(|(ts_name, mod_tileset)| {
                let tileset = tilesets.get(ts_name)?;
                let specs: Vec<_> = mod_tileset.sheets.iter().filter(|s| !s.is_fallback()).cloned().collect();
                let sheets = decode_sheets(tileset, &specs, &mod_tileset.root, &mod_tileset.mod_id);
                Some((ts_name.clone(), mod_tileset.mod_id.clone(), sheets))
            })
            .collect();

        for mod_tileset in mod_tilesets {
            if mod_tileset.sheets.iter().any(|s| s.is_fallback()) {
                report.warn(format!("Mod '{}' ships a fallback sheet; ignored", mod_tileset.mod_id));
            }
        }

        let mut touched = Vec::new();
        for (ts_name, mod_id, sheets) in decoded {
            for result in sheets {
                match result {
                    Ok(sheet) => self.register_decoded(&ts_name, sheet, report),
                    Err(e) => report.warn(format!("Skipping sheet from mod '{}': {}", mod_id, e)),
                }
            }
            if !touched.contains(&ts_name) {
                touched.push(ts_name);
            }
        }
        for ts_name in touched {
            self.sheets.finalize_tileset(&ts_name);
            tracing::info!("Applied mod tilesets to '{}'", ts_name);
        }
    }

    /// Register a tileset built in memory. Replaces one with the same folder name.
    pub fn register_tileset(&mut self, tileset: Tileset) {
        self.tilesets.register(tileset);
    }

    pub fn add_sheet(&mut self, tileset: &str, sheet: Sheet) {
        self.sheets.add_sheet(tileset, sheet);
    }

    pub fn add_tile(&mut self, tileset: &str, tile: Tile) {
        self.tiles.add_tile(tileset, tile);
    }

    /// Ensure a fallback sheet exists and rebuild the global sprite index.
    pub fn finalize_tileset(&mut self, tileset: &str) {
        self.ensure_fallback(tileset);
        self.sheets.finalize_tileset(tileset);
    }

    pub fn sheets(&self) -> &SheetStore {
        &self.sheets
    }

    pub fn tiles(&self) -> &TileRegistry {
        &self.tiles
    }

    /// Look a tileset up by folder name, then short name.
    pub fn get_tileset(&self, name: &str) -> Result<&Tileset, ServiceError> {
        self.tilesets
            .resolve_name(name)
            .and_then(|folder| self.tilesets.get(folder))
            .ok_or_else(|| ServiceError::TilesetNotFound(name.to_string()))
    }

    /// Loaded tilesets in load order.
    pub fn available_tilesets(&self) -> Vec<&Tileset> {
        self.tilesets.iter().collect()
    }

    /// The named tileset if loaded, else the first with a matching
    /// projection, else the first loaded.
    pub fn preferred_tileset(&self, name: Option<&str>, iso: bool) -> Result<&Tileset, ServiceError> {
        if let Some(name) = name {
            if let Ok(tileset) = self.get_tileset(name) {
                return Ok(tileset);
            }
        }
        let chosen = self
            .tilesets
            .iter()
            .find(|ts| ts.is_iso == iso)
            .or_else(|| self.tilesets.iter().next())
            .ok_or(ServiceError::NoTilesetsAvailable)?;
        if let Some(name) = name {
            tracing::warn!("Tileset '{}' not found, using '{}'", name, chosen.folder_name);
        }
        Ok(chosen)
    }

    /// Mods contributing sheets or tiles to a tileset, sorted.
    pub fn available_mods(&self, tileset: &str) -> Vec<String> {
        let mut mods: Vec<String> = self
            .sheets
            .mods(tileset)
            .into_iter()
            .chain(self.tiles.mods(tileset))
            .map(str::to_string)
            .collect();
        mods.sort();
        mods.dedup();
        mods
    }

    pub fn mod_statistics(&self, tileset: &str) -> BTreeMap<String, ModStats> {
        self.available_mods(tileset)
            .into_iter()
            .map(|mod_id| {
                let stats = ModStats {
                    sheets: self.sheets.sheets_from_mod(tileset, &mod_id).len(),
                    tiles: self.tiles.tile_count_for_mod(tileset, &mod_id),
                };
                (mod_id, stats)
            })
            .collect()
    }

    pub fn tileset_has_real_sprites(&self, tileset: &str) -> bool {
        self.sheets.has_real_sheets(tileset)
    }

    /// Resolve an object id to a materialized tile.
    ///
    /// Lookup honours seasonal variants and mod priority. When no tile
    /// matches, the result is the ASCII fallback for `fallback_color` and
    /// `fallback_symbol`.
    pub fn resolve(
        &self,
        tileset: &str,
        object_id: &str,
        fallback_color: &str,
        fallback_symbol: &str,
        season: Season,
        preferred_mods: &[String],
    ) -> TileObject {
        match self.tiles.get_tile_with_season_and_priority(tileset, object_id, season, preferred_mods) {
            Some(tile) => self.materialize(tileset, tile),
            None => self.fallback_object(tileset, object_id, fallback_color, fallback_symbol),
        }
    }

    /// Resolve only against tiles registered by one mod.
    pub fn resolve_from_mod(&self, tileset: &str, mod_id: &str, object_id: &str) -> Option<TileObject> {
        self.tiles.get_tile_from_mod(tileset, mod_id, object_id).map(|tile| self.materialize(tileset, tile))
    }

    fn materialize(&self, tileset: &str, tile: &Tile) -> TileObject {
        let style = self.sheets.sheet_info(tileset, &tile.sheet_id).cloned().unwrap_or_default();
        let mut sprites = BTreeMap::new();
        for id in tile.source.collect_sprite_ids() {
            let Some(index) = id.index() else {
                continue;
            };
            // Base-game tiles use the global index; mod tiles index their own sheets.
            let sprite = if tile.is_core() {
                self.sheets.sprite_by_global_index(tileset, index)
            } else {
                self.sheets.sprite_by_mod_index(tileset, &tile.mod_id, index, Some(&tile.sheet_id))
            };
            match sprite {
                Some(sprite) => {
                    sprites.insert(id, sprite);
                }
                None => tracing::debug!("Sprite {} of tile '{}' not found in '{}'", index, tile.tile_id, tileset),
            }
        }
        TileObject { source: tile.source.clone(), style, sprites }
    }

    fn fallback_object(&self, tileset: &str, object_id: &str, color: &str, symbol: &str) -> TileObject {
        let color = normalize_color(color);
        let sprite = self
            .sheets
            .ascii(tileset, &color, symbol)
            .unwrap_or_else(|| Arc::new(RgbaImage::new(BLANK_SPRITE_SIZE, BLANK_SPRITE_SIZE)));
        let style: SheetInfo = self.sheets.fallback_sheet(tileset).map(|s| s.info().clone()).unwrap_or_default();

        let mut sprites = BTreeMap::new();
        sprites.insert(SpriteId::NoSprite, sprite);
        TileObject { source: TileSource::fallback(object_id), style, sprites }
    }
}
