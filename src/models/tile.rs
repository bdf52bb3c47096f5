//! Tile definitions and materialized tile objects.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::sprite::{SpriteId, SpriteRef};
use super::tileset::SheetInfo;

/// Mod id of the base game. Its tiles address sprites through the
/// tileset-wide global index.
pub const CORE_MOD: &str = "dda";

fn default_tile_id() -> String {
    "unknown".to_string()
}

/// A raw tile definition from a `tiles-new` sheet entry.
///
/// Unknown keys in the source JSON are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSource {
    #[serde(default = "default_tile_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg: Option<SpriteRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<SpriteRef>,
    #[serde(default)]
    pub height_3d: i32,
    #[serde(default)]
    pub animated: bool,
    #[serde(default)]
    pub rotates: bool,
    #[serde(default)]
    pub multitile: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_tiles: Vec<TileSource>,
}

impl Default for TileSource {
    fn default() -> Self {
        Self {
            id: default_tile_id(),
            fg: None,
            bg: None,
            height_3d: 0,
            animated: false,
            rotates: false,
            multitile: false,
            additional_tiles: Vec::new(),
        }
    }
}

impl TileSource {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), ..Default::default() }
    }

    /// Source used for the ASCII fallback: `fg` is explicitly "no sprite".
    pub fn fallback(id: impl Into<String>) -> Self {
        Self { id: id.into(), fg: Some(SpriteRef::Single(SpriteId::NoSprite)), ..Default::default() }
    }

    /// Every sprite index referenced by this definition, including nested
    /// `additional_tiles`, with duplicates removed. Order of first
    /// appearance is preserved.
    pub fn collect_sprite_ids(&self) -> Vec<SpriteId> {
        let mut all = Vec::new();
        self.collect_recursive(&mut all);
        let mut seen = std::collections::HashSet::new();
        all.retain(|id| seen.insert(*id));
        all
    }

    fn collect_recursive(&self, out: &mut Vec<SpriteId>) {
        if let Some(fg) = &self.fg {
            fg.collect_into(out);
        }
        if let Some(bg) = &self.bg {
            bg.collect_into(out);
        }
        for sub in &self.additional_tiles {
            sub.collect_recursive(out);
        }
    }

    /// The `additional_tiles` entry for a subtile type, if defined.
    pub fn subtile(&self, subtile_type: &str) -> Option<&TileSource> {
        self.additional_tiles.iter().find(|t| t.id == subtile_type)
    }

    /// True when the foreground is the "no sprite" marker.
    pub fn has_no_sprite_fg(&self) -> bool {
        self.fg.as_ref().is_some_and(SpriteRef::is_no_sprite)
    }
}

/// A tile definition bound to the sheet and mod it was loaded from.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub tile_id: String,
    pub source: TileSource,
    pub sheet_id: String,
    pub mod_id: String,
}

impl Tile {
    pub fn new(source: TileSource, sheet_id: impl Into<String>, mod_id: impl Into<String>) -> Self {
        Self { tile_id: source.id.clone(), source, sheet_id: sheet_id.into(), mod_id: mod_id.into() }
    }

    pub fn is_core(&self) -> bool {
        self.mod_id == CORE_MOD
    }
}

/// A fully materialized tile: definition, sheet style and decoded sprites.
///
/// Produced per request and never cached by the service.
#[derive(Debug, Clone)]
pub struct TileObject {
    pub source: TileSource,
    pub style: SheetInfo,
    pub sprites: BTreeMap<SpriteId, Arc<RgbaImage>>,
}

impl TileObject {
    /// Whether this object is the synthesized ASCII fallback.
    pub fn is_fallback(&self) -> bool {
        self.source.has_no_sprite_fg()
    }

    /// Whether any sprite other than the fallback glyph was resolved.
    pub fn has_real_sprites(&self) -> bool {
        self.sprites.keys().any(|id| id.is_real())
    }

    pub fn sprite(&self, id: SpriteId) -> Option<&Arc<RgbaImage>> {
        self.sprites.get(&id)
    }
}

/// Season used for seasonal tile variants (`<id>_season_<season>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    #[default]
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    pub fn as_str(self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        }
    }

    /// Position in the four-entry seasonal lists used by game data.
    pub fn index(self) -> usize {
        match self {
            Season::Spring => 0,
            Season::Summer => 1,
            Season::Autumn => 2,
            Season::Winter => 3,
        }
    }

    /// Parse a season name, warning and using spring for unknown names.
    pub fn parse_lenient(name: &str) -> Season {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid season '{}', using spring", name);
            Season::Spring
        })
    }

    /// Seasonal tile id for a base id.
    pub fn variant_id(self, tile_id: &str) -> String {
        format!("{}_season_{}", tile_id, self.as_str())
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "autumn" => Ok(Season::Autumn),
            "winter" => Ok(Season::Winter),
            other => Err(format!("unknown season '{}'", other)),
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
