//! Loading a game directory: tilesets, mod tilesets and game data.

mod common;

use common::*;
use tilesrc::game_data::{mod_priority, GameDataStore, ObjectResolver};
use tilesrc::loader::{read_tileset, LoadError};
use tilesrc::models::{Season, SpriteId, CORE_MOD};
use tilesrc::service::{ServiceError, TilesetService};

fn load() -> (tempfile::TempDir, TilesetService, tilesrc::loader::LoadReport) {
    let game = game_dir();
    let (service, report) = TilesetService::load(game.path(), 2).expect("should load tilesets");
    (game, service, report)
}

fn color_of(object: &tilesrc::models::TileObject, id: u32) -> image::Rgba<u8> {
    *object.sprite(SpriteId::Real(id)).expect("sprite should be loaded").get_pixel(0, 0)
}

#[test]
fn test_tileset_metadata() {
    let game = game_dir();
    let (tileset, warnings) = read_tileset(&game.path().join("gfx").join(TILESET)).expect("should read tileset");
    assert!(warnings.is_empty());
    assert_eq!(tileset.short_name, "test");
    assert_eq!(tileset.view_name, "Test Set");
    assert_eq!(tileset.tile_size(), (TILE, TILE));
    assert_eq!(tileset.grid_z_height, 2);
    assert!(!tileset.is_iso);
    assert_eq!(tileset.sheets.len(), 1);
}

#[test]
fn test_load_registers_sheets_and_tiles() {
    let (_game, service, report) = load();
    assert_eq!(report.tilesets, 1);
    assert_eq!(service.available_tilesets().len(), 1);

    // The malformed tile is skipped with a warning; the rest load.
    assert!(report.warnings.iter().any(|w| w.to_string().contains("broken")));
    assert!(service.tiles().get_tile(TILESET, "broken").is_none());

    let floor =
        service.tiles().get_tile_from_mod(TILESET, CORE_MOD, "t_floor").expect("core t_floor should be registered");
    assert_eq!(floor.sheet_id, "main.png_4x4_0_0");
    assert_eq!(floor.mod_id, CORE_MOD);

    // The mod tileset registers t_floor again; unprioritized lookup returns the last registration.
    let latest = service.tiles().get_tile(TILESET, "t_floor").expect("t_floor should be registered");
    assert_eq!(latest.mod_id, MOD_ID);
    assert_eq!(latest.sheet_id, "moda:mod.png_4x4_0_0");

    // A list id registers once per id.
    assert!(service.tiles().get_tile(TILESET, "t_grass").is_some());
    assert!(service.tiles().get_tile(TILESET, "t_dirt").is_some());
}

#[test]
fn test_lookup_by_short_name() {
    let (_game, service, _) = load();
    assert_eq!(service.get_tileset("test").expect("short name should resolve").folder_name, TILESET);
    assert!(matches!(service.get_tileset("nope"), Err(ServiceError::TilesetNotFound(_))));
    assert_eq!(service.preferred_tileset(Some("nope"), true).expect("should fall back").folder_name, TILESET);
}

#[test]
fn test_resolve_core_tile_sprites() {
    let (_game, service, _) = load();
    let core = vec![CORE_MOD.to_string()];
    let floor = service.resolve(TILESET, "t_floor", "white", "?", Season::Spring, &core);
    assert!(!floor.is_fallback());
    assert_eq!(color_of(&floor, 0), RED);

    let latest = service.resolve(TILESET, "t_floor", "white", "?", Season::Spring, &[]);
    assert_eq!(color_of(&latest, 0), CYAN);

    let wall = service.resolve(TILESET, "t_wall", "white", "#", Season::Spring, &[]);
    assert!(wall.source.multitile);
    assert_eq!(color_of(&wall, 2), BLUE);
    assert_eq!(color_of(&wall, 3), YELLOW);
}

#[test]
fn test_unknown_id_resolves_to_fallback_glyph() {
    let (_game, service, _) = load();
    for id in ["t_unknown", "f_nothing", ""] {
        let object = service.resolve(TILESET, id, "light_red", "&", Season::Spring, &[]);
        assert!(object.is_fallback());
        assert_eq!(object.sprites.len(), 1);
        assert!(object.sprite(SpriteId::NoSprite).is_some());
        assert!(!object.has_real_sprites());
    }
}

#[test]
fn test_mod_tileset_merged() {
    let (_game, service, report) = load();
    assert!(report.warnings.iter().any(|w| w.to_string().contains("MissingSet")));
    assert_eq!(service.available_mods(TILESET), vec![CORE_MOD.to_string(), MOD_ID.to_string()]);

    let stats = service.mod_statistics(TILESET);
    assert_eq!(stats[MOD_ID].sheets, 1);
    assert_eq!(stats[MOD_ID].tiles, 3);

    let mod_wall = service.resolve_from_mod(TILESET, MOD_ID, "t_mod_wall").expect("mod tile should resolve");
    assert_eq!(color_of(&mod_wall, 1), MAGENTA);
    assert!(service.resolve_from_mod(TILESET, MOD_ID, "t_wall").is_none());
}

#[test]
fn test_mod_priority_and_season() {
    let (_game, service, _) = load();
    let prefs = mod_priority(&[MOD_ID.to_string()]);
    assert_eq!(prefs, vec![MOD_ID.to_string(), CORE_MOD.to_string()]);

    let floor = service.resolve(TILESET, "t_floor", "white", ".", Season::Spring, &prefs);
    assert_eq!(color_of(&floor, 0), CYAN);

    // The mod's seasonal tile wins over both core variants.
    let winter = service.resolve(TILESET, "t_floor", "white", ".", Season::Winter, &prefs);
    assert_eq!(color_of(&winter, 2), WHITE);

    let core_only = service.resolve(TILESET, "t_floor", "white", ".", Season::Winter, &[CORE_MOD.to_string()]);
    assert_eq!(color_of(&core_only, 3), YELLOW);

    let summer_core = service.resolve(TILESET, "t_floor", "white", ".", Season::Summer, &[CORE_MOD.to_string()]);
    assert_eq!(color_of(&summer_core, 0), RED);
}

#[test]
fn test_missing_gfx_dir_is_an_error() {
    let temp = tempfile::TempDir::new().expect("should create temp dir");
    assert!(matches!(TilesetService::load(temp.path(), 1), Err(LoadError::NotFound(_))));
}

#[test]
fn test_game_data_inheritance_and_priority() {
    let game = game_dir();
    let (store, report) = GameDataStore::load(game.path(), 2).expect("should load game data");
    assert!(report.warnings.is_empty());
    assert_eq!(store.mods(), &[CORE_MOD.to_string(), MOD_ID.to_string()]);

    let prefs = mod_priority(&[MOD_ID.to_string()]);
    let floor = store.resolve("t_floor", &prefs).expect("t_floor should resolve");
    assert_eq!(floor.mod_id, MOD_ID);
    assert_eq!(floor.color_for(Season::Spring), "red");
    assert_eq!(floor.symbol_for(Season::Spring), ".");

    let core_floor = store.resolve("t_floor", &[CORE_MOD.to_string()]).expect("core t_floor should resolve");
    assert_eq!(core_floor.color_for(Season::Spring), "brown");

    let painted = store.resolve("t_wall_painted", &prefs).expect("copy-from child should resolve");
    assert!(painted.connect_groups.contains("WALL"));
    assert_eq!(painted.looks_like.as_deref(), Some("t_wall"));
    assert_eq!(painted.symbol_for(Season::Winter), "#");

    let grass = store.resolve("t_grass", &prefs).expect("t_grass should resolve");
    assert_eq!(grass.color_for(Season::Autumn), "brown");

    assert!(store.resolve("f_table", &prefs).expect("f_table should resolve").workbench);
    assert!(store.resolve("t_missing", &prefs).is_none());
}
