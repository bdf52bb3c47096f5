//! Directory discovery for tilesets, mods and their JSON files.

use glob::glob;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::LoadError;

/// Files whose presence marks a directory as a tileset.
const TILESET_MARKERS: [&str; 2] = ["tileset.txt", "tile_config.json"];

/// The `gfx` directory under a game root.
pub fn find_gfx_dir(game_path: &Path) -> PathBuf {
    game_path.join("gfx")
}

fn glob_paths(pattern: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let pattern_str = pattern.to_string_lossy();
    let paths = glob(&pattern_str).map_err(|e| LoadError::Malformed {
        path: pattern.to_path_buf(),
        message: format!("invalid glob pattern: {}", e),
    })?;

    let mut found = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => found.push(path),
            Err(e) => tracing::warn!("Error reading path: {}", e),
        }
    }
    found.sort();
    Ok(found)
}

/// Tileset directories directly under `gfx_dir`, sorted by path.
pub fn discover_tileset_dirs(gfx_dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    if !gfx_dir.is_dir() {
        return Err(LoadError::NotFound(gfx_dir.to_path_buf()));
    }
    let mut dirs = BTreeSet::new();
    for marker in TILESET_MARKERS {
        for path in glob_paths(&gfx_dir.join("*").join(marker))? {
            if let Some(parent) = path.parent() {
                dirs.insert(parent.to_path_buf());
            }
        }
    }
    Ok(dirs.into_iter().collect())
}

/// Mod directories under `<game>/data/mods`, sorted. A missing mods
/// directory yields an empty list.
pub fn discover_mod_dirs(game_path: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let mods_dir = game_path.join("data").join("mods");
    if !mods_dir.is_dir() {
        tracing::info!("No mods directory found at {}", mods_dir.display());
        return Ok(Vec::new());
    }
    let dirs = glob_paths(&mods_dir.join("*"))?.into_iter().filter(|p| p.is_dir()).collect();
    Ok(dirs)
}

/// All `.json` files below `dir`, recursively, sorted.
pub fn discover_json_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let files = glob_paths(&dir.join("**").join("*.json"))?.into_iter().filter(|p| p.is_file()).collect();
    Ok(files)
}
