//! Shared fixture: a throwaway game directory with one base tileset, one
//! mod tileset and a little game data.

#![allow(dead_code)]

use image::{Rgba, RgbaImage};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const TILESET: &str = "TestSet";
pub const MOD_ID: &str = "moda";

pub const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
pub const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
pub const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
pub const YELLOW: Rgba<u8> = Rgba([255, 255, 0, 255]);
pub const CYAN: Rgba<u8> = Rgba([0, 255, 255, 255]);
pub const MAGENTA: Rgba<u8> = Rgba([255, 0, 255, 255]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Grid size of the test tileset.
pub const TILE: u32 = 4;

/// A strip of solid `TILE`x`TILE` sprites, one per color.
pub fn write_strip(path: &Path, colors: &[Rgba<u8>]) {
    let image = RgbaImage::from_fn(TILE * colors.len() as u32, TILE, |x, _| colors[(x / TILE) as usize]);
    image.save(path).expect("should write sheet png");
}

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("should create parent dirs");
    }
    fs::write(path, contents).expect("should write file");
}

const TILE_CONFIG: &str = r#"{
  "tile_info": [{ "width": 4, "height": 4, "pixelscale": 1, "zlevel_height": 2 }],
  "tiles-new": [
    {
      "file": "main.png",
      "tiles": [
        { "id": "t_floor", "fg": 0 },
        { "id": ["t_grass", "t_dirt"], "fg": 1 },
        { "id": "t_grass_season_winter", "fg": 3 },
        { "id": "t_floor_season_winter", "fg": 3 },
        {
          "id": "t_wall",
          "fg": 2,
          "multitile": true,
          "additional_tiles": [
            { "id": "edge", "fg": 3 },
            { "id": "t_connection", "fg": 1 }
          ]
        },
        { "id": "f_table", "fg": 1, "height_3d": 2 },
        { "id": "broken", "fg": { "nonsense": true } }
      ]
    }
  ]
}"#;

const MOD_TILESET: &str = r#"[
  {
    "type": "mod_tileset",
    "compatibility": ["test", "MissingSet"],
    "tiles-new": [
      {
        "file": "mod.png",
        "tiles": [
          { "id": "t_floor", "fg": 0 },
          { "id": "t_mod_wall", "fg": 1 },
          { "id": "t_floor_season_winter", "fg": 2 }
        ]
      }
    ]
  }
]"#;

const CORE_DATA: &str = r##"[
  { "type": "terrain", "id": "t_floor", "symbol": ".", "color": "brown" },
  { "type": "terrain", "id": "t_grass", "symbol": ".", "color": ["green", "green", "brown", "white"] },
  {
    "type": "terrain", "id": "t_wall", "symbol": "#", "color": "light_gray",
    "connect_groups": "WALL", "connects_to": "WALL"
  },
  { "type": "terrain", "id": "t_wall_painted", "copy-from": "t_wall", "looks_like": "t_wall" },
  { "type": "furniture", "id": "f_table", "symbol": "#", "color": "red", "workbench": { "multiplier": 1 } }
]"##;

const MOD_DATA: &str = r#"[
  { "type": "terrain", "id": "t_floor", "copy-from": "t_floor", "color": "red" },
  { "type": "terrain", "id": "t_mod_wall", "copy-from": "t_wall", "symbol": "X" }
]"#;

/// Build the fixture game directory:
///
/// ```text
/// gfx/TestSet/{tileset.txt, tile_config.json, main.png}
/// data/json/terrain.json
/// data/mods/moda/{terrain.json, gfx/mod_tileset.json, gfx/mod.png}
/// ```
///
/// `main.png` holds red, green, blue, yellow; `mod.png` cyan, magenta, white.
pub fn game_dir() -> TempDir {
    let temp = TempDir::new().expect("should create temp dir");
    let root = temp.path();

    let tileset_dir = root.join("gfx").join(TILESET);
    write(&tileset_dir.join("tileset.txt"), "NAME: test\nVIEW: Test Set\nJSON: tile_config.json\n");
    write(&tileset_dir.join("tile_config.json"), TILE_CONFIG);
    write_strip(&tileset_dir.join("main.png"), &[RED, GREEN, BLUE, YELLOW]);

    write(&root.join("data").join("json").join("terrain.json"), CORE_DATA);

    let mod_dir = root.join("data").join("mods").join(MOD_ID);
    write(&mod_dir.join("terrain.json"), MOD_DATA);
    write(&mod_dir.join("gfx").join("mod_tileset.json"), MOD_TILESET);
    write_strip(&mod_dir.join("gfx").join("mod.png"), &[CYAN, MAGENTA, WHITE]);

    temp
}

/// Write a scene file next to the fixture and return its path.
pub fn write_scene(dir: &Path, name: &str, json: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    write(&path, json);
    path
}
