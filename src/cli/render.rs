//! Render command implementation

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use crate::game_data::ObjectResolver;
use crate::map::{MapSource, MemoryMap, Scene};
use crate::renderer::{rasterize_map, TileRenderer};
use crate::selector::SpriteSelector;

use super::{Session, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the render command
pub(crate) fn run_render(session: &Session, scene_path: &Path, output: &Path, z: Option<i32>, padding: u32) -> ExitCode {
    let scene = match Scene::load(scene_path) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let map = match MemoryMap::from_scene(&scene) {
        Ok(map) => map,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    if map.is_empty() {
        eprintln!("Error: Scene {} places no objects", scene_path.display());
        return ExitCode::from(EXIT_ERROR);
    }

    let current_z = z.unwrap_or_else(|| map.min_z());
    if current_z < map.min_z() || current_z > map.max_z() {
        eprintln!("Error: --z {} is outside the scene's levels [{}, {}]", current_z, map.min_z(), map.max_z());
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let Some(tileset) = session.active_tileset() else {
        eprintln!("Error: No tilesets available");
        return ExitCode::from(EXIT_ERROR);
    };

    let mut renderer = TileRenderer::new();
    renderer.set_tileset_service(Arc::clone(&session.service));
    let game_data: Arc<dyn ObjectResolver> = session.game_data.clone();
    renderer.set_game_data(game_data);
    if let Err(e) = renderer.set_tileset(&tileset) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_ERROR);
    }
    renderer.set_season(session.config.render.season.as_str());
    renderer.set_preferred_mods(session.config.mod_priority());
    renderer.set_transparency(session.config.render.transparency);

    let mut selector = SpriteSelector::new();
    let image =
        match rasterize_map(&mut renderer, &mut selector, &map, current_z, &session.config.zlevel, padding) {
            Ok(image) => image,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        };

    if let Err(e) = image.save(output) {
        eprintln!("Error: Failed to write {}: {}", output.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }
    println!("Saved: {} ({}x{}, tileset {})", output.display(), image.width(), image.height(), tileset);
    ExitCode::from(EXIT_SUCCESS)
}
