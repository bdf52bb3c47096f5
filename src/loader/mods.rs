//! `mod_tileset` discovery: tileset extensions contributed by game mods.

use rayon::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{SheetSpec, Warning};

use super::discovery::{discover_json_files, discover_mod_dirs};
use super::LoadError;

const MOD_TILESET_TYPE: &str = "mod_tileset";

#[derive(Debug, Deserialize)]
struct ModTilesetDef {
    #[serde(default)]
    compatibility: Vec<String>,
    #[serde(default, rename = "tiles-new")]
    tiles_new: Vec<SheetSpec>,
}

/// A tileset extension declared by a mod.
#[derive(Debug, Clone)]
pub struct ModTileset {
    /// Mod directory name.
    pub mod_id: String,
    /// Base tileset names, by folder or short name.
    pub compatibility: Vec<String>,
    pub sheets: Vec<SheetSpec>,
    /// Directory sheet files are resolved against.
    pub root: PathBuf,
}

/// Parse every `mod_tileset` object in one JSON file.
///
/// The file may hold a single object or an array of objects; other object
/// types are ignored.
pub fn parse_mod_tileset_file(path: &Path, mod_id: &str) -> Result<(Vec<ModTileset>, Vec<Warning>), LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
    if !text.contains(MOD_TILESET_TYPE) {
        return Ok((Vec::new(), Vec::new()));
    }
    let value: serde_json::Value =
        serde_json::from_str(&text).map_err(|source| LoadError::Json { path: path.to_path_buf(), source })?;

    let objects = match value {
        serde_json::Value::Array(list) => list,
        other => vec![other],
    };
    let root = path.parent().map(Path::to_path_buf).unwrap_or_default();

    let mut found = Vec::new();
    let mut warnings = Vec::new();
    for object in objects {
        if object.get("type").and_then(|t| t.as_str()) != Some(MOD_TILESET_TYPE) {
            continue;
        }
        match serde_json::from_value::<ModTilesetDef>(object) {
            Ok(def) => found.push(ModTileset {
                mod_id: mod_id.to_string(),
                compatibility: def.compatibility,
                sheets: def.tiles_new,
                root: root.clone(),
            }),
            Err(e) => warnings.push(Warning::new(format!(
                "Skipping malformed mod_tileset in {}: {}",
                path.display(),
                e
            ))),
        }
    }
    Ok((found, warnings))
}

/// Collect all `mod_tileset` declarations under `<game>/data/mods`.
///
/// Files are parsed in parallel on the current rayon pool; results keep
/// mod and file order.
pub fn load_mod_tilesets(game_path: &Path) -> Result<(Vec<ModTileset>, Vec<Warning>), LoadError> {
    let mut jobs = Vec::new();
    for mod_dir in discover_mod_dirs(game_path)? {
        let mod_id = mod_dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        for file in discover_json_files(&mod_dir)? {
            jobs.push((mod_id.clone(), file));
        }
    }

    let results: Vec<_> =
        jobs.par_iter().map(|(mod_id, file)| parse_mod_tileset_file(file, mod_id)).collect();

    let mut tilesets = Vec::new();
    let mut warnings = Vec::new();
    for result in results {
        match result {
            Ok((found, file_warnings)) => {
                tilesets.extend(found);
                warnings.extend(file_warnings);
            }
            Err(e) => warnings.push(Warning::new(e.to_string())),
        }
    }
    Ok((tilesets, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_array_with_mixed_types() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tiles.json");
        fs::write(
            &path,
            r#"[
                {"type": "terrain", "id": "t_x"},
                {"type": "mod_tileset", "compatibility": ["UltimateCataclysm"],
                 "tiles-new": [{"file": "mod.png", "tiles": [{"id": "t_x", "fg": 0}]}]}
            ]"#,
        )
        .unwrap();
        let (found, warnings) = parse_mod_tileset_file(&path, "my_mod").unwrap();
        assert!(warnings.is_empty());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].mod_id, "my_mod");
        assert_eq!(found[0].compatibility, vec!["UltimateCataclysm"]);
        assert_eq!(found[0].sheets[0].file, "mod.png");
        assert_eq!(found[0].root, temp.path());
    }

    #[test]
    fn test_single_object_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("one.json");
        fs::write(&path, r#"{"type": "mod_tileset", "compatibility": ["A"], "tiles-new": []}"#).unwrap();
        let (found, _) = parse_mod_tileset_file(&path, "m").unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_malformed_json_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        fs::write(&path, r#"[{"type": "mod_tileset", "#).unwrap();
        assert!(matches!(parse_mod_tileset_file(&path, "m"), Err(LoadError::Json { .. })));
    }

    #[test]
    fn test_load_mod_tilesets_collects_warnings() {
        let temp = TempDir::new().unwrap();
        let mod_dir = temp.path().join("data/mods/alpha");
        fs::create_dir_all(&mod_dir).unwrap();
        fs::write(mod_dir.join("good.json"), r#"[{"type": "mod_tileset", "compatibility": ["A"]}]"#).unwrap();
        fs::write(mod_dir.join("broken.json"), r#"{"type": "mod_tileset""#).unwrap();
        let (found, warnings) = load_mod_tilesets(temp.path()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(warnings.len(), 1);
    }
}
