//! End-to-end rendering against the fixture game directory.

mod common;

use std::sync::Arc;

use common::*;
use image::RgbaImage;
use tilesrc::config::{load_config, merge_cli_overrides, CliOverrides};
use tilesrc::connectivity::{resolve_subtile, SubtileKind};
use tilesrc::game_data::{mod_priority, GameDataStore, ObjectResolver};
use tilesrc::map::{MapSource, MemoryMap, Scene};
use tilesrc::models::Season;
use tilesrc::renderer::{rasterize_map, render_map, DrawPrimitive, TileRenderer};
use tilesrc::selector::SpriteSelector;
use tilesrc::service::TilesetService;
use tilesrc::zlevel::ZLevelSettings;

struct Fixture {
    game: tempfile::TempDir,
    service: Arc<TilesetService>,
    store: Arc<GameDataStore>,
}

fn fixture() -> Fixture {
    let game = game_dir();
    let (service, _) = TilesetService::load(game.path(), 2).expect("should load tilesets");
    let (store, _) = GameDataStore::load(game.path(), 2).expect("should load game data");
    Fixture { game, service: Arc::new(service), store: Arc::new(store) }
}

fn renderer(fixture: &Fixture, mods: &[&str], season: &str) -> TileRenderer {
    let mut renderer = TileRenderer::new();
    renderer.set_tileset_service(Arc::clone(&fixture.service));
    let game_data: Arc<dyn ObjectResolver> = fixture.store.clone();
    renderer.set_game_data(game_data);
    renderer.set_tileset(TILESET).expect("fixture tileset should exist");
    renderer.set_season(season);
    renderer.set_preferred_mods(mod_priority(&mods.iter().map(|m| m.to_string()).collect::<Vec<_>>()));
    renderer
}

fn map(json: &str) -> MemoryMap {
    MemoryMap::from_scene(&Scene::parse(json).expect("scene should parse")).expect("scene should build")
}

fn rasterize(renderer: &mut TileRenderer, map: &MemoryMap) -> RgbaImage {
    rasterize_map(renderer, &mut SpriteSelector::new(), map, 0, &ZLevelSettings::default(), 0)
        .expect("render should succeed")
}

#[test]
fn test_wall_row_uses_connected_subtiles() {
    let fixture = fixture();
    let mut renderer = renderer(&fixture, &[], "spring");
    let image = rasterize(&mut renderer, &map(r####"{ "rows": ["###"], "terrain": { "#": "t_wall" } }"####));

    assert_eq!(image.dimensions(), (3 * TILE, TILE));
    // End pieces have no dedicated art and use the base sprite.
    assert_eq!(*image.get_pixel(1, 1), BLUE);
    assert_eq!(*image.get_pixel(TILE + 1, 1), YELLOW);
    assert_eq!(*image.get_pixel(2 * TILE + 1, 1), BLUE);
}

#[test]
fn test_t_connection_points_at_missing_neighbor() {
    let fixture = fixture();
    let scene = map(r##"{ "rows": [" # ", " ##", " # "], "terrain": { "#": "t_wall", " ": "t_floor" } }"##);

    let neighbors = scene.neighbor_cells(1, 1, 0);
    let subtile = resolve_subtile(fixture.store.as_ref(), &[], "t_wall", &neighbors, "#");
    assert_eq!(subtile.kind, SubtileKind::TConnection);
    // [N, W, S, E]: west is the open side.
    assert_eq!(subtile.index, 1);

    let mut renderer = renderer(&fixture, &[], "spring");
    let image = rasterize(&mut renderer, &scene);
    assert_eq!(*image.get_pixel(TILE + 1, TILE + 1), GREEN);
    assert_eq!(*image.get_pixel(1, 1), RED);
}

#[test]
fn test_mod_priority_and_season_in_render() {
    let fixture = fixture();
    let floor = map(r#"{ "rows": ["."], "terrain": { ".": "t_floor" } }"#);

    let mut core = renderer(&fixture, &[], "spring");
    assert_eq!(*rasterize(&mut core, &floor).get_pixel(0, 0), RED);

    let mut modded = renderer(&fixture, &[MOD_ID], "spring");
    assert_eq!(*rasterize(&mut modded, &floor).get_pixel(0, 0), CYAN);

    modded.set_season("winter");
    assert_eq!(modded.season(), Season::Winter);
    assert_eq!(*rasterize(&mut modded, &floor).get_pixel(0, 0), WHITE);
}

#[test]
fn test_looks_like_and_fallback_glyph() {
    let fixture = fixture();
    let mut renderer = renderer(&fixture, &[], "spring");

    let painted = map(r#"{ "rows": ["p"], "terrain": { "p": "t_wall_painted" } }"#);
    assert_eq!(*rasterize(&mut renderer, &painted).get_pixel(1, 1), BLUE);

    let unknown = map(r#"{ "rows": ["?"], "terrain": { "?": "t_unknown" } }"#);
    let prims = render_map(&mut renderer, &mut SpriteSelector::new(), &unknown, 0, &ZLevelSettings::default())
        .expect("render should succeed");
    assert_eq!(prims.len(), 1);
    assert!(!prims[0].is_placeholder());
}

#[test]
fn test_levels_stack_with_zlevel_height() {
    let fixture = fixture();
    let mut renderer = renderer(&fixture, &[], "spring");
    assert_eq!(renderer.zlevel_height(), 2);

    let scene = map(
        r#"{ "levels": [
            { "z": 0, "rows": ["."], "terrain": { ".": "t_floor" } },
            { "z": 1, "rows": ["g"], "terrain": { "g": "t_grass" } }
        ] }"#,
    );
    assert_eq!((scene.min_z(), scene.max_z()), (0, 1));

    let settings = ZLevelSettings { enabled: true, ..Default::default() };
    let prims = render_map(&mut renderer, &mut SpriteSelector::new(), &scene, 0, &settings).expect("should render");
    let placed: Vec<(i32, f32, f32)> = prims
        .iter()
        .map(|p| match p {
            DrawPrimitive::Sprite { y, brightness, opacity, .. } => (*y, *brightness, *opacity),
            DrawPrimitive::Placeholder(_) => panic!("expected sprites"),
        })
        .collect();
    assert_eq!(placed.len(), 2);
    assert_eq!(placed[0], (0, 1.0, 1.0));
    assert_eq!(placed[1].0, -2);
    assert!(placed[1].2 < 1.0);

    // Viewed from above, the lower level is the dimmed one.
    let from_above = render_map(&mut renderer, &mut SpriteSelector::new(), &scene, 1, &settings).expect("should render");
    assert_eq!(from_above[0].bounds().1, 2);
}

#[test]
fn test_config_drives_render() {
    let fixture = fixture();
    let config_path = fixture.game.path().join("tilesrc.toml");
    std::fs::write(&config_path, "[game]\npath = \".\"\n\n[mods]\nactive = [\"moda\"]\n\n[render]\nseason = \"winter\"\n")
        .expect("should write config");

    let mut config = load_config(Some(&config_path)).expect("should load config");
    assert_eq!(config.game.path, fixture.game.path().join("."));
    merge_cli_overrides(&mut config, &CliOverrides { season: Some(Season::Spring), ..Default::default() });

    let mut renderer = renderer(&fixture, &["dda"], config.render.season.as_str());
    renderer.set_preferred_mods(config.mod_priority());
    let floor = map(r#"{ "rows": ["."], "terrain": { ".": "t_floor" } }"#);
    assert_eq!(*rasterize(&mut renderer, &floor).get_pixel(0, 0), CYAN);
}
