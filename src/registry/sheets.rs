//! Sprite sheet store with dual sprite addressing.
//!
//! Base-game tiles reference sprites by a tileset-wide global index that
//! counts every sprite of every sheet in load order. Mod tiles reference
//! sprites by an index local to one of the mod's own sheets. Both paths
//! are kept separate here; mixing them up resolves the wrong art.

use image::RgbaImage;
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{SheetInfo, FALLBACK_SHEET};
use crate::sheet::Sheet;

#[derive(Debug, Default)]
struct TilesetSheets {
    sheets: Vec<Sheet>,
    by_id: HashMap<String, usize>,
    /// mod id -> sheet ids, in registration order
    by_mod: HashMap<String, Vec<String>>,
    mod_order: Vec<String>,
    /// global index -> (position in `sheets`, local index)
    global: Vec<(usize, usize)>,
    dirty: bool,
}

/// All loaded sheets, per tileset.
#[derive(Debug, Default)]
pub struct SheetStore {
    tilesets: HashMap<String, TilesetSheets>,
}

impl SheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sheet under a tileset and its mod.
    ///
    /// A sheet with an id already present replaces the old one in place.
    /// The global index is not updated until [`SheetStore::finalize_tileset`].
    pub fn add_sheet(&mut self, tileset: &str, sheet: Sheet) {
        let entry = self.tilesets.entry(tileset.to_string()).or_default();
        let id = sheet.id().to_string();
        let mod_id = sheet.info().mod_id.clone();

        match entry.by_id.get(&id) {
            Some(&pos) => entry.sheets[pos] = sheet,
            None => {
                entry.by_id.insert(id.clone(), entry.sheets.len());
                entry.sheets.push(sheet);
            }
        }

        let mod_sheets = entry.by_mod.entry(mod_id.clone()).or_default();
        if !mod_sheets.contains(&id) {
            mod_sheets.push(id);
        }
        if !entry.mod_order.contains(&mod_id) {
            entry.mod_order.push(mod_id);
        }
        entry.dirty = true;
    }

    /// Rebuild the dense global index for a tileset in one pass.
    ///
    /// Call once after all sheets of a load batch are added.
    pub fn finalize_tileset(&mut self, tileset: &str) {
        let Some(entry) = self.tilesets.get_mut(tileset) else {
            return;
        };
        let total: usize = entry.sheets.iter().map(Sheet::len).sum();
        let mut global = Vec::with_capacity(total);
        for (pos, sheet) in entry.sheets.iter().enumerate() {
            global.extend((0..sheet.len()).map(|local| (pos, local)));
        }
        entry.global = global;
        entry.dirty = false;
        tracing::debug!(
            "Finalized tileset '{}': {} sheets, {} sprites",
            tileset,
            entry.sheets.len(),
            total
        );
    }

    pub fn is_finalized(&self, tileset: &str) -> bool {
        self.tilesets.get(tileset).is_some_and(|e| !e.dirty)
    }

    /// Sprite by tileset-wide global index (base-game addressing).
    pub fn sprite_by_global_index(&self, tileset: &str, index: u32) -> Option<Arc<RgbaImage>> {
        let entry = self.tilesets.get(tileset)?;
        let &(pos, local) = entry.global.get(index as usize)?;
        entry.sheets.get(pos)?.sprite(local).cloned()
    }

    /// Sprite by index local to one of a mod's sheets (mod addressing).
    ///
    /// `sheet_hint` is tried first when it names one of the mod's sheets
    /// and the index fits; otherwise the first mod sheet large enough wins.
    pub fn sprite_by_mod_index(
        &self,
        tileset: &str,
        mod_id: &str,
        index: u32,
        sheet_hint: Option<&str>,
    ) -> Option<Arc<RgbaImage>> {
        let entry = self.tilesets.get(tileset)?;
        let mod_sheets = entry.by_mod.get(mod_id)?;
        let index = index as usize;

        let lookup = |sheet_id: &str| -> Option<Arc<RgbaImage>> {
            let sheet = &entry.sheets[*entry.by_id.get(sheet_id)?];
            sheet.sprite(index).cloned()
        };

        if let Some(hint) = sheet_hint {
            if mod_sheets.iter().any(|s| s == hint) {
                if let Some(sprite) = lookup(hint) {
                    return Some(sprite);
                }
            }
        }
        mod_sheets.iter().find_map(|sheet_id| lookup(sheet_id))
    }

    pub fn sheet(&self, tileset: &str, sheet_id: &str) -> Option<&Sheet> {
        let entry = self.tilesets.get(tileset)?;
        entry.by_id.get(sheet_id).map(|&pos| &entry.sheets[pos])
    }

    pub fn sheet_info(&self, tileset: &str, sheet_id: &str) -> Option<&SheetInfo> {
        self.sheet(tileset, sheet_id).map(Sheet::info)
    }

    pub fn fallback_sheet(&self, tileset: &str) -> Option<&Sheet> {
        self.sheet(tileset, FALLBACK_SHEET).filter(|s| s.is_fallback())
    }

    /// ASCII glyph from the tileset's fallback sheet.
    pub fn ascii(&self, tileset: &str, color: &str, symbol: &str) -> Option<Arc<RgbaImage>> {
        self.fallback_sheet(tileset)?.ascii_sprite(color, symbol).cloned()
    }

    /// Mods that contributed at least one sheet, in registration order.
    pub fn mods(&self, tileset: &str) -> Vec<&str> {
        self.tilesets
            .get(tileset)
            .map(|e| e.mod_order.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn sheets_from_mod(&self, tileset: &str, mod_id: &str) -> &[String] {
        self.tilesets
            .get(tileset)
            .and_then(|e| e.by_mod.get(mod_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn sheet_count(&self, tileset: &str) -> usize {
        self.tilesets.get(tileset).map_or(0, |e| e.sheets.len())
    }

    /// Number of globally indexed sprites as of the last finalize.
    pub fn sprite_count(&self, tileset: &str) -> usize {
        self.tilesets.get(tileset).map_or(0, |e| e.global.len())
    }

    /// True when the tileset has any sheet besides the fallback sheet.
    pub fn has_real_sheets(&self, tileset: &str) -> bool {
        self.tilesets
            .get(tileset)
            .is_some_and(|e| e.sheets.iter().any(|s| !s.is_fallback() && !s.is_empty()))
    }

    pub fn remove_tileset(&mut self, tileset: &str) {
        self.tilesets.remove(tileset);
    }
}
