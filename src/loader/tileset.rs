//! Base tileset parsing: `tileset.txt`, the tile config JSON, and sheet
//! decoding.

use rayon::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{SheetSpec, Tile, TileInfo, TileSource, Tileset, Warning};
use crate::sheet::Sheet;

use super::LoadError;

/// Tile config file names tried when `tileset.txt` names none.
const DEFAULT_CONFIGS: [&str; 2] = ["tile_config.json", "tile_info.json"];

#[derive(Debug, Default, Deserialize)]
struct TileConfig {
    #[serde(default)]
    tile_info: Vec<TileInfo>,
    #[serde(default, rename = "tiles-new")]
    tiles_new: Vec<serde_json::Value>,
}

/// A decoded sheet plus the tiles it defines, ready to be registered.
#[derive(Debug)]
pub struct DecodedSheet {
    pub sheet: Sheet,
    pub tiles: Vec<Tile>,
    pub warnings: Vec<Warning>,
}

fn read_text(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })
}

/// Parse `NAME:`, `VIEW:` and `JSON:` lines. Returns the JSON file name if given.
fn apply_tileset_txt(tileset: &mut Tileset, contents: &str) -> Option<String> {
    let mut json_name = None;
    for line in contents.lines() {
        if let Some(value) = line.strip_prefix("NAME:") {
            tileset.short_name = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix("VIEW:") {
            tileset.view_name = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix("JSON:") {
            json_name = Some(value.trim().to_string());
        }
    }
    json_name
}

fn find_tile_config(dir: &Path, json_name: Option<&str>) -> Option<PathBuf> {
    match json_name {
        Some(name) => Some(dir.join(name)).filter(|p| p.is_file()),
        None => DEFAULT_CONFIGS.iter().map(|name| dir.join(name)).find(|p| p.is_file()),
    }
}

/// Read tileset metadata and sheet descriptors from a tileset directory.
///
/// Sheet images are not decoded here.
pub fn read_tileset(dir: &Path) -> Result<(Tileset, Vec<Warning>), LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::NotFound(dir.to_path_buf()));
    }
    let folder_name = dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let mut tileset = Tileset::new(folder_name);
    tileset.root = dir.to_path_buf();
    let mut warnings = Vec::new();

    let txt = dir.join("tileset.txt");
    let json_name = if txt.is_file() {
        match read_text(&txt) {
            Ok(contents) => apply_tileset_txt(&mut tileset, &contents),
            Err(e) => {
                warnings.push(Warning::new(e.to_string()));
                None
            }
        }
    } else {
        None
    };

    let Some(config_path) = find_tile_config(dir, json_name.as_deref()) else {
        warnings.push(Warning::new(LoadError::MissingTileConfig(dir.to_path_buf()).to_string()));
        return Ok((tileset, warnings));
    };

    let config: TileConfig = match read_text(&config_path).and_then(|text| {
        serde_json::from_str(&text).map_err(|source| LoadError::Json { path: config_path.clone(), source })
    }) {
        Ok(config) => config,
        Err(e) => {
            warnings.push(Warning::new(e.to_string()));
            return Ok((tileset, warnings));
        }
    };

    if let Some(info) = config.tile_info.first() {
        tileset.apply_tile_info(info);
    }
    for (i, value) in config.tiles_new.into_iter().enumerate() {
        match serde_json::from_value::<SheetSpec>(value) {
            Ok(spec) => tileset.sheets.push(spec),
            Err(e) => warnings.push(Warning::new(format!(
                "Skipping sheet #{} in {}: {}",
                i,
                config_path.display(),
                e
            ))),
        }
    }

    Ok((tileset, warnings))
}

/// Turn a sheet's raw tile entries into bound tiles.
///
/// A list-valued `id` registers one tile per id. Entries that fail to
/// parse are reported and skipped.
pub fn parse_sheet_tiles(
    values: &[serde_json::Value],
    sheet_id: &str,
    mod_id: &str,
    origin: &str,
) -> (Vec<Tile>, Vec<Warning>) {
    let mut tiles = Vec::new();
    let mut warnings = Vec::new();

    for value in values {
        let ids: Vec<String> = match value.get("id") {
            Some(serde_json::Value::String(id)) => vec![id.clone()],
            Some(serde_json::Value::Array(list)) => {
                list.iter().filter_map(|v| v.as_str().map(str::to_string)).collect()
            }
            _ => {
                warnings.push(Warning::new(format!("Skipping tile without id in {}", origin)));
                continue;
            }
        };

        for id in ids {
            let mut entry = value.clone();
            if let Some(obj) = entry.as_object_mut() {
                obj.insert("id".to_string(), serde_json::Value::String(id.clone()));
            }
            match serde_json::from_value::<TileSource>(entry) {
                Ok(source) => tiles.push(Tile::new(source, sheet_id, mod_id)),
                Err(e) => {
                    warnings.push(Warning::new(format!("Skipping tile '{}' in {}: {}", id, origin, e)))
                }
            }
        }
    }

    (tiles, warnings)
}

/// Decode one sheet image and its tiles.
pub fn decode_sheet(
    tileset: &Tileset,
    spec: &SheetSpec,
    root: &Path,
    mod_id: &str,
) -> Result<DecodedSheet, LoadError> {
    let path = root.join(&spec.file);
    let image = image::open(&path)
        .map_err(|source| LoadError::Image { path: path.clone(), source })?
        .to_rgba8();
    let info = spec.sheet_info(tileset, mod_id);

    if spec.is_fallback() {
        return Ok(DecodedSheet { sheet: Sheet::fallback(info, &image), tiles: Vec::new(), warnings: Vec::new() });
    }

    let origin = path.display().to_string();
    let (tiles, warnings) = parse_sheet_tiles(&spec.tiles, &info.name, mod_id, &origin);
    let sources = tiles.iter().map(|t| t.source.clone()).collect();
    let sheet = Sheet::new(info, &image, sources);
    Ok(DecodedSheet { sheet, tiles, warnings })
}

/// Decode sheets in parallel on the current rayon pool. Results keep the
/// order of `specs`.
pub fn decode_sheets(
    tileset: &Tileset,
    specs: &[SheetSpec],
    root: &Path,
    mod_id: &str,
) -> Vec<Result<DecodedSheet, LoadError>> {
    specs.par_iter().map(|spec| decode_sheet(tileset, spec, root, mod_id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_apply_tileset_txt() {
        let mut ts = Tileset::new("folder");
        let json = apply_tileset_txt(
            &mut ts,
            "#comment\nNAME: UltiCa\nVIEW: Ultimate Cataclysm\nJSON: tile_config.json\n",
        );
        assert_eq!(ts.short_name, "UltiCa");
        assert_eq!(ts.view_name, "Ultimate Cataclysm");
        assert_eq!(json.as_deref(), Some("tile_config.json"));
    }

    #[test]
    fn test_read_tileset_metadata() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("Iso");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("tileset.txt"), "NAME: iso\nVIEW: Iso Tiles\n").unwrap();
        fs::write(
            dir.join("tile_config.json"),
            r#"{"tile_info": [{"width": 64, "height": 32, "iso": true, "zlevel_height": 16}],
                "tiles-new": [{"file": "a.png"}, {"nofile": true}]}"#,
        )
        .unwrap();

        let (ts, warnings) = read_tileset(&dir).unwrap();
        assert_eq!(ts.folder_name, "Iso");
        assert_eq!(ts.short_name, "iso");
        assert!(ts.is_iso);
        assert_eq!(ts.grid_z_height, 16);
        assert_eq!(ts.sheets.len(), 1);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_read_tileset_without_config_warns() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("tileset.txt"), "NAME: x\n").unwrap();
        let (ts, warnings) = read_tileset(temp.path()).unwrap();
        assert!(ts.sheets.is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_parse_sheet_tiles_expands_id_lists() {
        let values: Vec<serde_json::Value> = serde_json::from_str(
            r#"[{"id": ["t_dirt", "t_sand"], "fg": 3},
                {"id": "t_bad", "fg": [1, {"weight": 1, "sprite": 2}]},
                {"fg": 4}]"#,
        )
        .unwrap();
        let (tiles, warnings) = parse_sheet_tiles(&values, "sheet", "dda", "test");
        let ids: Vec<_> = tiles.iter().map(|t| t.tile_id.as_str()).collect();
        assert_eq!(ids, vec!["t_dirt", "t_sand"]);
        assert_eq!(warnings.len(), 2);
        assert!(tiles.iter().all(|t| t.sheet_id == "sheet"));
    }
}
