//! Tileset metadata and sheet descriptors.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::tile::CORE_MOD;

/// File name that marks a sheet as the ASCII fallback sheet.
pub const FALLBACK_SHEET: &str = "fallback.png";

fn default_grid() -> u32 {
    32
}

fn default_pixelscale() -> u32 {
    1
}

fn default_retract_min() -> f32 {
    2.5
}

fn default_retract_max() -> f32 {
    5.0
}

/// The first entry of a tile config's `tile_info` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileInfo {
    #[serde(default = "default_pixelscale")]
    pub pixelscale: u32,
    #[serde(default = "default_grid")]
    pub width: u32,
    #[serde(default = "default_grid")]
    pub height: u32,
    #[serde(default)]
    pub zlevel_height: i32,
    #[serde(default)]
    pub iso: bool,
    #[serde(default = "default_retract_min")]
    pub retract_dist_min: f32,
    #[serde(default = "default_retract_max")]
    pub retract_dist_max: f32,
}

impl Default for TileInfo {
    fn default() -> Self {
        Self {
            pixelscale: default_pixelscale(),
            width: default_grid(),
            height: default_grid(),
            zlevel_height: 0,
            iso: false,
            retract_dist_min: default_retract_min(),
            retract_dist_max: default_retract_max(),
        }
    }
}

/// One `tiles-new` entry: a sprite sheet file plus the tiles drawn from it.
///
/// Tiles are kept as raw JSON so a single malformed definition can be
/// skipped without losing the rest of the sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetSpec {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite_height: Option<u32>,
    #[serde(default)]
    pub sprite_offset_x: i32,
    #[serde(default)]
    pub sprite_offset_y: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite_offset_x_retracted: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite_offset_y_retracted: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixelscale: Option<u32>,
    #[serde(default)]
    pub tiles: Vec<serde_json::Value>,
}

impl SheetSpec {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            sprite_width: None,
            sprite_height: None,
            sprite_offset_x: 0,
            sprite_offset_y: 0,
            sprite_offset_x_retracted: None,
            sprite_offset_y_retracted: None,
            pixelscale: None,
            tiles: Vec::new(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.file == FALLBACK_SHEET
    }

    /// Resolve this descriptor against its tileset's grid into sheet style.
    pub fn sheet_info(&self, tileset: &Tileset, mod_id: &str) -> SheetInfo {
        let sprite_width = self.sprite_width.unwrap_or(tileset.grid_width);
        let sprite_height = self.sprite_height.unwrap_or(tileset.grid_height);
        let name = if self.is_fallback() {
            FALLBACK_SHEET.to_string()
        } else {
            let base = format!(
                "{}_{}x{}_{}_{}",
                self.file, sprite_width, sprite_height, self.sprite_offset_x, self.sprite_offset_y
            );
            // Mod sheet ids are scoped by mod.
            if mod_id == CORE_MOD {
                base
            } else {
                format!("{}:{}", mod_id, base)
            }
        };
        SheetInfo {
            name,
            file: self.file.clone(),
            sprite_width,
            sprite_height,
            mod_id: mod_id.to_string(),
            sprite_count: 0,
            sprite_offset_x: self.sprite_offset_x,
            sprite_offset_y: self.sprite_offset_y,
            sprite_offset_x_retracted: self.sprite_offset_x_retracted.unwrap_or(self.sprite_offset_x),
            sprite_offset_y_retracted: self.sprite_offset_y_retracted.unwrap_or(self.sprite_offset_y),
            pixelscale: self.pixelscale.unwrap_or(tileset.pixelscale).max(1),
        }
    }
}

/// Geometry and provenance of a loaded sheet.
///
/// Offsets are applied when a sprite is positioned, never when slicing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetInfo {
    pub name: String,
    pub file: String,
    pub sprite_width: u32,
    pub sprite_height: u32,
    pub mod_id: String,
    pub sprite_count: usize,
    pub sprite_offset_x: i32,
    pub sprite_offset_y: i32,
    pub sprite_offset_x_retracted: i32,
    pub sprite_offset_y_retracted: i32,
    pub pixelscale: u32,
}

impl Default for SheetInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            file: String::new(),
            sprite_width: default_grid(),
            sprite_height: default_grid(),
            mod_id: CORE_MOD.to_string(),
            sprite_count: 0,
            sprite_offset_x: 0,
            sprite_offset_y: 0,
            sprite_offset_x_retracted: 0,
            sprite_offset_y_retracted: 0,
            pixelscale: 1,
        }
    }
}

/// Tileset metadata. One per tileset folder on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Tileset {
    pub folder_name: String,
    pub short_name: String,
    pub view_name: String,
    pub pixelscale: u32,
    pub grid_width: u32,
    pub grid_height: u32,
    pub grid_z_height: i32,
    pub is_iso: bool,
    pub retract_dist_min: f32,
    pub retract_dist_max: f32,
    /// Directory sheet files are resolved against.
    pub root: PathBuf,
    /// Raw `tiles-new` descriptors from the tile config.
    pub sheets: Vec<SheetSpec>,
}

impl Tileset {
    pub fn new(folder_name: impl Into<String>) -> Self {
        let folder_name = folder_name.into();
        Self {
            short_name: folder_name.clone(),
            view_name: folder_name.clone(),
            folder_name,
            pixelscale: 1,
            grid_width: 32,
            grid_height: 32,
            grid_z_height: 0,
            is_iso: false,
            retract_dist_min: default_retract_min(),
            retract_dist_max: default_retract_max(),
            root: PathBuf::new(),
            sheets: Vec::new(),
        }
    }

    pub fn apply_tile_info(&mut self, info: &TileInfo) {
        self.pixelscale = info.pixelscale.max(1);
        self.grid_width = info.width;
        self.grid_height = info.height;
        self.grid_z_height = info.zlevel_height;
        self.is_iso = info.iso;
        self.retract_dist_min = info.retract_dist_min;
        self.retract_dist_max = info.retract_dist_max;
    }

    /// On-screen tile size after pixel scaling.
    pub fn tile_size(&self) -> (u32, u32) {
        (self.grid_width * self.pixelscale, self.grid_height * self.pixelscale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_spec_defaults_to_grid() {
        let mut ts = Tileset::new("MyTiles");
        ts.grid_width = 24;
        ts.grid_height = 48;
        ts.pixelscale = 2;
        let spec: SheetSpec =
            serde_json::from_str(r#"{"file": "tiles.png", "sprite_offset_y": -16}"#).unwrap();
        let info = spec.sheet_info(&ts, "dda");
        assert_eq!(info.sprite_width, 24);
        assert_eq!(info.sprite_height, 48);
        assert_eq!(info.pixelscale, 2);
        assert_eq!(info.name, "tiles.png_24x48_0_-16");
        assert_eq!(info.sprite_offset_y_retracted, -16);
    }

    #[test]
    fn test_mod_sheet_name_is_scoped() {
        let ts = Tileset::new("MyTiles");
        let spec = SheetSpec::new("tiles.png");
        assert_eq!(spec.sheet_info(&ts, "modA").name, "modA:tiles.png_32x32_0_0");
    }

    #[test]
    fn test_fallback_sheet_name() {
        let ts = Tileset::new("MyTiles");
        let spec = SheetSpec::new(FALLBACK_SHEET);
        assert!(spec.is_fallback());
        assert_eq!(spec.sheet_info(&ts, "dda").name, FALLBACK_SHEET);
    }

    #[test]
    fn test_tile_info_defaults() {
        let info: TileInfo = serde_json::from_str(r#"{"iso": true, "width": 64}"#).unwrap();
        let mut ts = Tileset::new("Iso");
        ts.apply_tile_info(&info);
        assert!(ts.is_iso);
        assert_eq!(ts.tile_size(), (64, 32));
        assert_eq!(ts.retract_dist_max, 5.0);
    }
}
