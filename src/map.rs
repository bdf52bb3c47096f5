//! In-memory maps and the scene files the command line renders.
//!
//! A scene is a small mapgen-like JSON document: each level has `rows` of
//! symbols and per-slot palettes mapping symbols to object ids.
//!
//! ```json
//! {
//!   "levels": [
//!     { "z": 0, "rows": ["###", "#c."], "terrain": { "#": "t_wall", ".": "t_floor", "c": "t_floor" },
//!       "furniture": { "c": "f_chair" } },
//!     { "z": 1, "rows": ["..."], "terrain": { ".": "t_open_air" } }
//!   ]
//! }
//! ```
//!
//! A document with a single level may drop the `levels` wrapper.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::connectivity::Direction;
use crate::models::{CellError, CellSlot, MapCell};

/// Read access to map cells, as consumed by the renderer.
pub trait MapSource {
    fn cell_at(&self, x: i32, y: i32, z: i32) -> Option<&MapCell>;

    /// Size of every level in cells.
    fn size(&self) -> (i32, i32);

    fn min_z(&self) -> i32;

    fn max_z(&self) -> i32;

    /// Neighbors in `[N, W, S, E]` order.
    fn neighbor_cells(&self, x: i32, y: i32, z: i32) -> [Option<&MapCell>; 4] {
        Direction::ALL.map(|dir| {
            let (dx, dy) = dir.offset();
            self.cell_at(x + dx, y + dy, z)
        })
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MapError {
    #[error("Failed to read scene {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid scene JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid cell content at ({x}, {y}, {z}): {source}")]
    Cell {
        x: i32,
        y: i32,
        z: i32,
        #[source]
        source: CellError,
    },
    #[error("Scene has no levels")]
    Empty,
}

/// One z-level of a scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneLevel {
    #[serde(default)]
    pub z: i32,
    pub rows: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub terrain: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub furniture: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub items: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub creatures: BTreeMap<String, String>,
}

impl SceneLevel {
    fn palettes(&self) -> [(CellSlot, &BTreeMap<String, String>); 5] {
        [
            (CellSlot::Terrain, &self.terrain),
            (CellSlot::Fields, &self.fields),
            (CellSlot::Furniture, &self.furniture),
            (CellSlot::Items, &self.items),
            (CellSlot::Creatures, &self.creatures),
        ]
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SceneDocument {
    Levels { levels: Vec<SceneLevel> },
    Single(SceneLevel),
}

/// A parsed scene file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub levels: Vec<SceneLevel>,
}

impl Scene {
    pub fn parse(json: &str) -> Result<Self, MapError> {
        let levels = match serde_json::from_str(json)? {
            SceneDocument::Levels { levels } => levels,
            SceneDocument::Single(level) => vec![level],
        };
        if levels.is_empty() {
            return Err(MapError::Empty);
        }
        Ok(Self { levels })
    }

    pub fn load(path: &Path) -> Result<Self, MapError> {
        let json = fs::read_to_string(path).map_err(|source| MapError::Io { path: path.to_path_buf(), source })?;
        Self::parse(&json)
    }
}

/// A map held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryMap {
    width: i32,
    height: i32,
    min_z: i32,
    max_z: i32,
    cells: HashMap<(i32, i32, i32), MapCell>,
}

impl MemoryMap {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height, ..Default::default() }
    }

    /// Put one object into a cell, growing the z range as needed.
    pub fn place(&mut self, x: i32, y: i32, z: i32, slot: CellSlot, object_id: &str) -> Result<(), CellError> {
        let was_empty = self.cells.is_empty();
        self.cells.entry((x, y, z)).or_default().set_content(slot, object_id, 1)?;
        if was_empty {
            self.min_z = z;
            self.max_z = z;
        } else {
            self.min_z = self.min_z.min(z);
            self.max_z = self.max_z.max(z);
        }
        Ok(())
    }

    pub fn set_cell(&mut self, x: i32, y: i32, z: i32, cell: MapCell) {
        if self.cells.is_empty() {
            self.min_z = z;
            self.max_z = z;
        }
        self.min_z = self.min_z.min(z);
        self.max_z = self.max_z.max(z);
        self.cells.insert((x, y, z), cell);
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Build a map from a scene. Symbols without a palette entry leave the
    /// cell empty.
    pub fn from_scene(scene: &Scene) -> Result<Self, MapError> {
        let height = scene.levels.iter().map(|l| l.rows.len()).max().unwrap_or(0) as i32;
        let width = scene
            .levels
            .iter()
            .flat_map(|l| l.rows.iter())
            .map(|row| row.chars().count())
            .max()
            .unwrap_or(0) as i32;

        let mut map = MemoryMap::new(width, height);
        for level in &scene.levels {
            let palettes = level.palettes();
            for (y, row) in level.rows.iter().enumerate() {
                for (x, symbol) in row.chars().enumerate() {
                    let (x, y, z) = (x as i32, y as i32, level.z);
                    let key = symbol.to_string();
                    for (slot, palette) in &palettes {
                        if let Some(object_id) = palette.get(&key) {
                            map.place(x, y, z, *slot, object_id)
                                .map_err(|source| MapError::Cell { x, y, z, source })?;
                        }
                    }
                }
            }
        }
        Ok(map)
    }
}

impl MapSource for MemoryMap {
    fn cell_at(&self, x: i32, y: i32, z: i32) -> Option<&MapCell> {
        self.cells.get(&(x, y, z))
    }

    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn min_z(&self) -> i32 {
        self.min_z
    }

    fn max_z(&self) -> i32 {
        self.max_z
    }
}
