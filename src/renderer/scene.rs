//! Whole-map rendering across z-levels.

use image::RgbaImage;
use tracing::{debug, warn};

use super::{Canvas, DrawPrimitive, LevelEffect, RenderError, TileRenderer};
use crate::coords::CoordinateTransformer;
use crate::map::MapSource;
use crate::selector::SpriteSelector;
use crate::zlevel::ZLevelSettings;

/// Render one z-level in paint order: isometric maps back to front by
/// [`CoordinateTransformer::iso_sort_key`], orthogonal maps row by row.
pub fn render_z_level(
    renderer: &mut TileRenderer,
    selector: &mut SpriteSelector<'_>,
    map: &dyn MapSource,
    z: i32,
    effect: LevelEffect,
) -> Result<Vec<DrawPrimitive>, RenderError> {
    if z < map.min_z() || z > map.max_z() {
        warn!("Invalid z-level {}, map range is [{}, {}]", z, map.min_z(), map.max_z());
        return Ok(Vec::new());
    }

    let (width, height) = map.size();
    let mut positions: Vec<(i32, i32)> = Vec::new();
    for y in 0..height {
        for x in 0..width {
            if map.cell_at(x, y, z).is_some() {
                positions.push((x, y));
            }
        }
    }
    if renderer.transformer().is_iso {
        positions.sort_by_key(|&(x, y)| CoordinateTransformer::iso_sort_key(x, y));
    }

    let mut out = Vec::new();
    for (x, y) in positions {
        let Some(cell) = map.cell_at(x, y, z) else {
            continue;
        };
        let neighbors = map.neighbor_cells(x, y, z);
        out.extend(renderer.render_tile(selector, x, y, cell, &neighbors, effect)?);
    }
    Ok(out)
}

/// Render the levels around `current_z` from lowest to highest. Each level
/// is raised by the tileset's z-level height per step and dimmed per
/// `settings`. With multi-level rendering disabled only `current_z` is
/// drawn.
pub fn render_map(
    renderer: &mut TileRenderer,
    selector: &mut SpriteSelector<'_>,
    map: &dyn MapSource,
    current_z: i32,
    settings: &ZLevelSettings,
) -> Result<Vec<DrawPrimitive>, RenderError> {
    if !settings.enabled {
        return render_z_level(renderer, selector, map, current_z, LevelEffect::default());
    }

    let range = settings.level_range();
    let z_low = map.min_z().max(current_z + range.start());
    let z_high = map.max_z().min(current_z + range.end());
    let zlevel_height = renderer.zlevel_height();
    debug!("Multi-z-level: rendering z-levels {} to {} (current={})", z_low, z_high, current_z);

    let mut out = Vec::new();
    for z in z_low..=z_high {
        let offset = z - current_z;
        let (brightness, opacity) = settings.factors(offset);
        let effect = LevelEffect { y_offset: -offset * zlevel_height, brightness, opacity };
        debug!(
            "  z={}: offset={}, y_offset={}, brightness={:.2}, transparency={:.2}",
            z, offset, effect.y_offset, brightness, opacity
        );
        out.extend(render_z_level(renderer, selector, map, z, effect)?);
    }
    Ok(out)
}

/// Render the map around `current_z` and rasterize it onto a canvas sized
/// to the drawn content plus `padding`.
pub fn rasterize_map(
    renderer: &mut TileRenderer,
    selector: &mut SpriteSelector<'_>,
    map: &dyn MapSource,
    current_z: i32,
    settings: &ZLevelSettings,
    padding: u32,
) -> Result<RgbaImage, RenderError> {
    let primitives = render_map(renderer, selector, map, current_z, settings)?;
    let mut canvas = Canvas::fit(&primitives, padding);
    canvas.draw_all(&primitives);
    debug!("Rasterized {} primitives onto {:?}", primitives.len(), canvas.image().dimensions());
    Ok(canvas.into_image())
}
