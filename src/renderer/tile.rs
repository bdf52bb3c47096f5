//! Per-cell rendering.

use image::RgbaImage;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{DrawPrimitive, LevelEffect, RenderError};
use crate::connectivity::{resolve_subtile, workbench_index, Subtile};
use crate::coords::CoordinateTransformer;
use crate::game_data::{ObjectResolver, ResolvedObject};
use crate::models::{MapCell, Season, SpriteId, SpriteRef, TileObject};
use crate::placeholder::Placeholder;
use crate::selector::SpriteSelector;
use crate::service::{normalize_color, TilesetService};
use crate::transform::SpriteTransformer;

/// Object flag: the fallback glyph follows the wall connection shape.
pub const AUTO_WALL_SYMBOL: &str = "AUTO_WALL_SYMBOL";
/// Object flag: the rotation frame faces the neighboring workbench.
pub const ALIGN_WORKBENCH: &str = "ALIGN_WORKBENCH";
/// Id suffix of see-through variants.
pub const TRANSPARENT_SUFFIX: &str = "_transparent";

/// A sprite chosen for a cell, before scaling.
struct Picked {
    image: Arc<RgbaImage>,
    rotation: u32,
}

impl Picked {
    fn plain(image: Arc<RgbaImage>) -> Self {
        Self { image, rotation: 0 }
    }
}

fn single_id(value: Option<&SpriteRef>) -> Option<SpriteId> {
    match value {
        Some(SpriteRef::Single(id)) => Some(*id),
        _ => None,
    }
}

/// Turns map cells into draw primitives for one tileset.
pub struct TileRenderer {
    service: Option<Arc<TilesetService>>,
    game_data: Option<Arc<dyn ObjectResolver>>,
    transformer: CoordinateTransformer,
    zlevel_height: i32,
    scene_offset: (i32, i32),
    tileset: Option<String>,
    season: Season,
    preferred_mods: Vec<String>,
    transparency: bool,
    sprites: SpriteTransformer,
    resolved_objects: HashMap<(i32, i32), String>,
}

impl Default for TileRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TileRenderer {
    pub fn new() -> Self {
        Self {
            service: None,
            game_data: None,
            transformer: CoordinateTransformer::default(),
            zlevel_height: 0,
            scene_offset: (0, 0),
            tileset: None,
            season: Season::Spring,
            preferred_mods: Vec::new(),
            transparency: false,
            sprites: SpriteTransformer::new(),
            resolved_objects: HashMap::new(),
        }
    }

    pub fn set_tileset_service(&mut self, service: Arc<TilesetService>) {
        self.service = Some(service);
    }

    pub fn set_game_data(&mut self, game_data: Arc<dyn ObjectResolver>) {
        self.game_data = Some(game_data);
    }

    /// Switch the active tileset and adopt its projection and tile size.
    /// Cached drawables are dropped when the name changes.
    pub fn set_tileset(&mut self, name: &str) -> Result<(), RenderError> {
        let service = self.service.as_ref().ok_or(RenderError::NoTilesetService)?;
        let tileset = service.get_tileset(name)?;
        self.transformer = CoordinateTransformer::from_tileset(tileset);
        self.zlevel_height = tileset.grid_z_height;
        let folder = tileset.folder_name.clone();
        if self.tileset.as_deref() != Some(folder.as_str()) {
            self.sprites.clear();
        }
        self.tileset = Some(folder);
        Ok(())
    }

    pub fn tileset(&self) -> Option<&str> {
        self.tileset.as_deref()
    }

    /// Set the season by name; unknown names fall back to spring.
    pub fn set_season(&mut self, name: &str) {
        self.season = Season::parse_lenient(name);
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn set_preferred_mods(&mut self, mods: Vec<String>) {
        self.preferred_mods = mods;
    }

    pub fn set_transparency(&mut self, enabled: bool) {
        self.transparency = enabled;
    }

    pub fn set_scene_offset(&mut self, offset: (i32, i32)) {
        self.scene_offset = offset;
    }

    pub fn transformer(&self) -> &CoordinateTransformer {
        &self.transformer
    }

    /// Pixel rise between stacked z-levels.
    pub fn zlevel_height(&self) -> i32 {
        self.zlevel_height
    }

    pub fn sprite_transformer(&self) -> &SpriteTransformer {
        &self.sprites
    }

    /// The id actually drawn at `(x, y)` when the last render went through
    /// `looks_like`.
    pub fn resolved_object_id(&self, x: i32, y: i32) -> Option<&str> {
        self.resolved_objects.get(&(x, y)).map(String::as_str)
    }

    fn active_tileset(&self, service: &TilesetService) -> Option<String> {
        if let Some(name) = &self.tileset {
            return Some(name.clone());
        }
        let first = service.available_tilesets().first().map(|t| t.folder_name.clone())?;
        warn!("No tileset set, defaulting to: {}", first);
        Some(first)
    }

    fn fallback_params(&self, object: Option<&ResolvedObject>) -> (String, String) {
        match object {
            Some(object) => (normalize_color(object.color_for(self.season)), object.symbol_for(self.season).to_string()),
            None => ("white".to_string(), "?".to_string()),
        }
    }

    /// Render every object of a cell in slot order. Each object's
    /// `height_3d` lifts the objects drawn after it.
    pub fn render_tile(
        &mut self,
        selector: &mut SpriteSelector<'_>,
        x: i32,
        y: i32,
        cell: &MapCell,
        neighbors: &[Option<&MapCell>; 4],
        effect: LevelEffect,
    ) -> Result<Vec<DrawPrimitive>, RenderError> {
        let service = self.service.clone().ok_or(RenderError::NoTilesetService)?;
        let game_data = self.game_data.clone().ok_or(RenderError::NoGameData)?;

        let mut out = Vec::new();
        let Some(tileset) = self.active_tileset(&service) else {
            for object_id in cell.object_ids() {
                warn!("Failed to render tile {} at ({}, {}): no tileset available", object_id, x, y);
                out.push(self.placeholder(x, y, object_id, effect));
            }
            return Ok(out);
        };

        let mut stack_height = 0;
        for object_id in cell.object_ids() {
            let candidate = if self.transparency {
                self.transparent_variant(&service, game_data.as_ref(), &tileset, object_id)
            } else {
                object_id.to_string()
            };
            let ctx = RenderContext { service: &service, game_data: game_data.as_ref(), tileset: &tileset };
            stack_height +=
                self.render_object(&ctx, selector, x, y, &candidate, stack_height, neighbors, effect, &mut out);
        }
        Ok(out)
    }

    /// `<id>_transparent` when the tileset has real art for it.
    fn transparent_variant(
        &self,
        service: &TilesetService,
        game_data: &dyn ObjectResolver,
        tileset: &str,
        object_id: &str,
    ) -> String {
        let transparent_id = format!("{object_id}{TRANSPARENT_SUFFIX}");
        let object = game_data.resolve(object_id, &self.preferred_mods);
        let (color, symbol) = self.fallback_params(object.as_ref());
        let probe = service.resolve(tileset, &transparent_id, &color, &symbol, self.season, &self.preferred_mods);
        if probe.has_real_sprites() {
            transparent_id
        } else {
            object_id.to_string()
        }
    }

    fn placeholder(&self, x: i32, y: i32, object_id: &str, effect: LevelEffect) -> DrawPrimitive {
        let offset = (self.scene_offset.0, self.scene_offset.1 + effect.y_offset);
        DrawPrimitive::Placeholder(Placeholder::for_tile(&self.transformer, x, y, offset, object_id))
    }

    /// Render one object and return its `height_3d`.
    fn render_object(
        &mut self,
        ctx: &RenderContext<'_>,
        selector: &mut SpriteSelector<'_>,
        x: i32,
        y: i32,
        object_id: &str,
        stack_height: i32,
        neighbors: &[Option<&MapCell>; 4],
        effect: LevelEffect,
        out: &mut Vec<DrawPrimitive>,
    ) -> i32 {
        let prefs = self.preferred_mods.clone();
        let object = ctx.game_data.resolve(object_id, &prefs);
        let (color, mut symbol) = self.fallback_params(object.as_ref());
        let subtile = resolve_subtile(ctx.game_data, &prefs, object_id, neighbors, &symbol);

        let mut wb_index = 0;
        if let Some(object) = &object {
            if object.has_flag(ALIGN_WORKBENCH) {
                wb_index = workbench_index(ctx.game_data, &prefs, neighbors);
            }
            if object.has_flag(AUTO_WALL_SYMBOL) {
                symbol = subtile.symbol.clone();
            }
        }

        let mut drawn_id = object_id.to_string();
        let mut tile = ctx.service.resolve(ctx.tileset, object_id, &color, &symbol, self.season, &prefs);
        if tile.source.has_no_sprite_fg() {
            if let Some(looks_like) = object.as_ref().and_then(|o| o.looks_like.as_deref()) {
                debug!("FG sprite is fallback for {}, trying looks_like: {}", object_id, looks_like);
                drawn_id = looks_like.to_string();
                tile = ctx.service.resolve(ctx.tileset, looks_like, &color, &symbol, self.season, &prefs);
            }
        }
        if drawn_id != object_id {
            self.resolved_objects.insert((x, y), drawn_id.clone());
        } else {
            self.resolved_objects.remove(&(x, y));
        }

        let (mut fg, mut bg) = (None, None);
        for index in [subtile.alt_index, subtile.index] {
            (fg, bg) = self.sprites_for_tile(selector, &tile, x, y, &drawn_id, &subtile, index, wb_index);
            if fg.is_some() {
                break;
            }
        }

        if fg.is_none() && bg.is_none() {
            debug!("No sprites for {} at ({}, {}), drawing placeholder", drawn_id, x, y);
            out.push(self.placeholder(x, y, &drawn_id, effect));
            return 0;
        }

        let style = &tile.style;
        let sprite_offset = (style.sprite_offset_x, style.sprite_offset_y - stack_height + effect.y_offset);
        let (sx, sy) = self.transformer.scene_position(x, y, self.scene_offset, sprite_offset);
        let scale = style.pixelscale.max(1);
        for picked in [bg, fg].into_iter().flatten() {
            let image = self.sprites.rotated_scaled(&picked.image, picked.rotation, scale);
            out.push(DrawPrimitive::Sprite {
                image,
                x: sx,
                y: sy,
                brightness: effect.brightness,
                opacity: effect.opacity,
            });
        }
        tile.source.height_3d
    }

    /// Foreground and background for one subtile index.
    fn sprites_for_tile(
        &self,
        selector: &mut SpriteSelector<'_>,
        tile: &TileObject,
        x: i32,
        y: i32,
        object_id: &str,
        subtile: &Subtile,
        index: usize,
        wb_index: usize,
    ) -> (Option<Picked>, Option<Picked>) {
        if tile.source.multitile {
            return Self::multitile_sprites(selector, tile, x, y, object_id, subtile, index);
        }
        let fg = self.simple_sprite(selector, tile, x, y, object_id, wb_index, tile.source.fg.as_ref());
        let bg = self.simple_sprite(selector, tile, x, y, object_id, wb_index, tile.source.bg.as_ref());
        (fg.map(Picked::plain), bg.map(Picked::plain))
    }

    fn multitile_sprites(
        selector: &mut SpriteSelector<'_>,
        tile: &TileObject,
        x: i32,
        y: i32,
        object_id: &str,
        subtile: &Subtile,
        index: usize,
    ) -> (Option<Picked>, Option<Picked>) {
        let source = &tile.source;
        let part = source.subtile(subtile.kind.as_str());

        let (fg_id, bg_id) = match part {
            Some(part) => {
                let animated = part.animated || source.animated;
                let key = format!("{}#{}", object_id, subtile.kind);
                (
                    Self::multitile_value(selector, part.fg.as_ref(), index, &key, animated, x, y),
                    Self::multitile_value(selector, part.bg.as_ref(), index, &format!("{key}_bg"), animated, x, y),
                )
            }
            None => (single_id(source.fg.as_ref()), single_id(source.bg.as_ref())),
        };

        // Single sprites are drawn for the primary connection, whichever
        // index picked them.
        let rotates = |value: Option<&SpriteRef>| {
            if source.rotates && part.is_some() && matches!(value, Some(SpriteRef::Single(_))) {
                subtile.kind.rotation_angle(subtile.index)
            } else {
                0
            }
        };
        let pick = |id: Option<SpriteId>, rotation: u32| {
            let image = tile.sprite(id.filter(|id| id.is_real())?)?;
            Some(Picked { image: Arc::clone(image), rotation })
        };

        (
            pick(fg_id, rotates(part.and_then(|p| p.fg.as_ref()))),
            pick(bg_id, rotates(part.and_then(|p| p.bg.as_ref()))),
        )
    }

    /// A subtile's fg/bg narrowed to one sprite for `index`.
    fn multitile_value(
        selector: &mut SpriteSelector<'_>,
        value: Option<&SpriteRef>,
        index: usize,
        key: &str,
        animated: bool,
        x: i32,
        y: i32,
    ) -> Option<SpriteId> {
        match value? {
            SpriteRef::Single(id) => Some(*id),
            SpriteRef::Rotations(ids) => ids.get(index).copied(),
            SpriteRef::Weighted(frames) if frames.is_empty() => None,
            SpriteRef::Weighted(frames) => selector.select_frame(frames, x, y, key, animated).sprite.at(index),
        }
    }

    fn simple_sprite(
        &self,
        selector: &mut SpriteSelector<'_>,
        tile: &TileObject,
        x: i32,
        y: i32,
        object_id: &str,
        wb_index: usize,
        value: Option<&SpriteRef>,
    ) -> Option<Arc<RgbaImage>> {
        let source = &tile.source;
        match value? {
            SpriteRef::Single(id) => tile.sprite(*id).cloned(),
            SpriteRef::Rotations(ids) if ids.is_empty() => None,
            SpriteRef::Rotations(ids) => {
                if !source.rotates {
                    warn!("List of indices without rotates for {}", object_id);
                    return None;
                }
                tile.sprite(ids[wb_index % ids.len()]).cloned()
            }
            SpriteRef::Weighted(frames) if frames.is_empty() => None,
            SpriteRef::Weighted(frames) => {
                if source.rotates {
                    warn!("Weighted sprites with rotates for {}", object_id);
                    return None;
                }
                let id = selector.select_sprite(frames, x, y, object_id, source.animated);
                tile.sprite(id).cloned()
            }
        }
    }
}

/// Shared handles for one render call.
struct RenderContext<'a> {
    service: &'a TilesetService,
    game_data: &'a dyn ObjectResolver,
    tileset: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::{classify, SubtileKind};
    use crate::game_data::Seasonal;
    use crate::models::{CellSlot, SheetInfo, Tile, TileSource, Tileset, WeightedSprite, CORE_MOD};
    use crate::sheet::Sheet;
    use image::Rgba;

    /// Sheet of `count` 2x1 sprites. Sprite `i` has red `10 * i`; its right
    /// pixel has green 255.
    fn sheet(count: u32) -> Sheet {
        let img = RgbaImage::from_fn(count * 2, 1, |x, _| Rgba([(x / 2) as u8 * 10, (x % 2) as u8 * 255, 0, 255]));
        let info = SheetInfo {
            name: "s.png".to_string(),
            file: "s.png".to_string(),
            sprite_width: 2,
            sprite_height: 1,
            mod_id: CORE_MOD.to_string(),
            ..SheetInfo::default()
        };
        Sheet::new(info, &img, Vec::new())
    }

    fn simple(id: &str, fg: u32) -> TileSource {
        let mut source = TileSource::new(id);
        source.fg = Some(SpriteRef::from(fg));
        source
    }

    fn service(tiles: Vec<TileSource>) -> Arc<TilesetService> {
        let mut service = TilesetService::new();
        service.register_tileset(Tileset::new("Test"));
        service.add_sheet("Test", sheet(8));
        for source in tiles {
            service.add_tile("Test", Tile::new(source, "s.png", CORE_MOD));
        }
        service.add_sheet("Test", Sheet::default_fallback(2, 1));
        service.finalize_tileset("Test");
        Arc::new(service)
    }

    fn objects(list: Vec<ResolvedObject>) -> Arc<dyn ObjectResolver> {
        let map: HashMap<String, ResolvedObject> = list.into_iter().map(|o| (o.id.clone(), o)).collect();
        Arc::new(map)
    }

    fn renderer(tiles: Vec<TileSource>, objs: Vec<ResolvedObject>) -> TileRenderer {
        let mut renderer = TileRenderer::new();
        renderer.set_tileset_service(service(tiles));
        renderer.set_game_data(objects(objs));
        renderer.set_tileset("Test").unwrap();
        renderer
    }

    fn cell(ids: &[(CellSlot, &str)]) -> MapCell {
        let mut cell = MapCell::new();
        for (slot, id) in ids {
            cell.set_content(*slot, id, 1).unwrap();
        }
        cell
    }

    fn sprite_red(p: &DrawPrimitive) -> u8 {
        match p {
            DrawPrimitive::Sprite { image, .. } => image.get_pixel(0, 0)[0],
            DrawPrimitive::Placeholder(_) => panic!("expected sprite"),
        }
    }

    const NO_NEIGHBORS: [Option<&MapCell>; 4] = [None; 4];

    #[test]
    fn test_wiring_errors() {
        let mut bare = TileRenderer::new();
        let c = cell(&[(CellSlot::Terrain, "t_floor")]);
        let mut selector = SpriteSelector::new();
        assert_eq!(
            bare.render_tile(&mut selector, 0, 0, &c, &NO_NEIGHBORS, LevelEffect::default()).unwrap_err(),
            RenderError::NoTilesetService
        );
        bare.set_tileset_service(service(vec![]));
        assert_eq!(
            bare.render_tile(&mut selector, 0, 0, &c, &NO_NEIGHBORS, LevelEffect::default()).unwrap_err(),
            RenderError::NoGameData
        );
        assert!(matches!(bare.set_tileset("Missing"), Err(RenderError::Service(_))));
    }

    #[test]
    fn test_simple_tile_and_fallback_glyph() {
        let mut r = renderer(vec![simple("t_floor", 3)], vec![]);
        let c = cell(&[(CellSlot::Terrain, "t_floor"), (CellSlot::Furniture, "f_unknown")]);
        let prims = r.render_tile(&mut SpriteSelector::new(), 1, 0, &c, &NO_NEIGHBORS, LevelEffect::default()).unwrap();
        assert_eq!(prims.len(), 2);
        assert_eq!(sprite_red(&prims[0]), 30);
        // Unknown furniture still draws something: the fallback glyph.
        assert!(!prims[1].is_placeholder());
        assert_eq!(prims[0].bounds(), (32, 0, 2, 1));
    }

    #[test]
    fn test_looks_like_used_once() {
        let mut chair = ResolvedObject::new("f_armchair", "furniture");
        chair.looks_like = Some("f_chair".to_string());
        let mut r = renderer(vec![simple("f_chair", 5)], vec![chair]);
        let c = cell(&[(CellSlot::Furniture, "f_armchair")]);
        let prims = r.render_tile(&mut SpriteSelector::new(), 2, 3, &c, &NO_NEIGHBORS, LevelEffect::default()).unwrap();
        assert_eq!(sprite_red(&prims[0]), 50);
        assert_eq!(r.resolved_object_id(2, 3), Some("f_chair"));
    }

    #[test]
    fn test_height_3d_stacks_within_cell() {
        let mut table = simple("f_table", 1);
        table.height_3d = 4;
        let mut r = renderer(vec![table, simple("i_cup", 2)], vec![]);
        let c = cell(&[(CellSlot::Furniture, "f_table"), (CellSlot::Items, "i_cup")]);
        let prims = r.render_tile(&mut SpriteSelector::new(), 0, 0, &c, &NO_NEIGHBORS, LevelEffect::default()).unwrap();
        assert_eq!(prims[0].bounds().1, 0);
        assert_eq!(prims[1].bounds().1, -4);
    }

    #[test]
    fn test_multitile_end_piece_rotates() {
        let mut wall = TileSource::new("t_wall");
        wall.multitile = true;
        wall.rotates = true;
        wall.fg = Some(SpriteRef::from(0));
        wall.additional_tiles = vec![simple("end_piece", 4)];
        let mut wall_obj = ResolvedObject::new("t_wall", "terrain");
        wall_obj.symbol = Some(Seasonal::Fixed("#".to_string()));
        let mut r = renderer(vec![wall], vec![wall_obj]);

        let c = cell(&[(CellSlot::Terrain, "t_wall")]);
        let north = cell(&[(CellSlot::Terrain, "t_wall")]);
        let neighbors = [Some(&north), None, None, None];
        let prims = r.render_tile(&mut SpriteSelector::new(), 0, 0, &c, &neighbors, LevelEffect::default()).unwrap();
        // Connected north only: end piece index 2, rotated 180 degrees.
        let DrawPrimitive::Sprite { image, .. } = &prims[0] else {
            panic!("expected sprite");
        };
        assert_eq!(*image.get_pixel(0, 0), Rgba([40, 255, 0, 255]));
        assert_eq!(*image.get_pixel(1, 0), Rgba([40, 0, 0, 255]));
    }

    #[test]
    fn test_alt_index_hit_rotates_by_primary_index() {
        let mut wall = TileSource::new("t_wall");
        wall.multitile = true;
        wall.rotates = true;
        wall.fg = Some(SpriteRef::from(0));
        wall.additional_tiles = vec![simple("edge", 4)];
        let mut wall_obj = ResolvedObject::new("t_wall", "terrain");
        wall_obj.rotates_to.insert("POST".to_string());
        let mut post = ResolvedObject::new("t_post", "terrain");
        post.connect_groups.insert("POST".to_string());
        let mut r = renderer(vec![wall], vec![wall_obj, post]);

        // W and E connect: horizontal edge, index 1. A post to the north
        // gives alt index 3, which the single edge sprite also satisfies.
        let subtile = classify([false, true, false, true], [true, false, false, false], "#");
        assert_eq!((subtile.kind, subtile.index, subtile.alt_index), (SubtileKind::Edge, 1, 3));

        let c = cell(&[(CellSlot::Terrain, "t_wall")]);
        let north = cell(&[(CellSlot::Terrain, "t_post")]);
        let side = cell(&[(CellSlot::Terrain, "t_wall")]);
        let neighbors = [Some(&north), Some(&side), None, Some(&side)];
        let prims = r.render_tile(&mut SpriteSelector::new(), 0, 0, &c, &neighbors, LevelEffect::default()).unwrap();
        let DrawPrimitive::Sprite { image, .. } = &prims[0] else {
            panic!("expected sprite");
        };
        // Rotated 90 degrees for edge index 1, not left as-is for index 3.
        assert_eq!(image.dimensions(), (1, 2));
        assert_eq!(*image.get_pixel(0, 0), Rgba([40, 0, 0, 255]));
        assert_eq!(*image.get_pixel(0, 1), Rgba([40, 255, 0, 255]));
    }

    #[test]
    fn test_multitile_without_sprites_is_placeholder() {
        let mut wall = TileSource::new("t_fence");
        wall.multitile = true;
        let mut r = renderer(vec![wall], vec![]);
        let c = cell(&[(CellSlot::Terrain, "t_fence")]);
        let prims = r.render_tile(&mut SpriteSelector::new(), 0, 0, &c, &NO_NEIGHBORS, LevelEffect::default()).unwrap();
        assert_eq!(prims.len(), 1);
        assert!(prims[0].is_placeholder());
    }

    #[test]
    fn test_transparent_variant_preferred_when_real() {
        let mut r = renderer(vec![simple("t_wall", 1), simple("t_wall_transparent", 6)], vec![]);
        let c = cell(&[(CellSlot::Terrain, "t_wall"), (CellSlot::Furniture, "f_bed")]);
        r.set_transparency(true);
        let prims = r.render_tile(&mut SpriteSelector::new(), 0, 0, &c, &NO_NEIGHBORS, LevelEffect::default()).unwrap();
        assert_eq!(sprite_red(&prims[0]), 60);
        r.set_transparency(false);
        let prims = r.render_tile(&mut SpriteSelector::new(), 0, 0, &c, &NO_NEIGHBORS, LevelEffect::default()).unwrap();
        assert_eq!(sprite_red(&prims[0]), 10);
    }

    #[test]
    fn test_workbench_alignment_selects_rotation() {
        let mut stool = TileSource::new("f_stool");
        stool.rotates = true;
        stool.fg = Some(SpriteRef::Rotations(vec![SpriteId::Real(0), SpriteId::Real(1), SpriteId::Real(2), SpriteId::Real(3)]));
        let mut stool_obj = ResolvedObject::new("f_stool", "furniture");
        stool_obj.flags.insert(ALIGN_WORKBENCH.to_string());
        let mut bench = ResolvedObject::new("f_workbench", "furniture");
        bench.workbench = true;
        let mut r = renderer(vec![stool], vec![stool_obj, bench]);

        let c = cell(&[(CellSlot::Furniture, "f_stool")]);
        let west = cell(&[(CellSlot::Furniture, "f_workbench")]);
        let neighbors = [None, Some(&west), None, None];
        let prims = r.render_tile(&mut SpriteSelector::new(), 0, 0, &c, &neighbors, LevelEffect::default()).unwrap();
        assert_eq!(sprite_red(&prims[0]), 10);
    }

    #[test]
    fn test_level_effect_carried() {
        let mut grass = TileSource::new("t_grass");
        grass.fg = Some(SpriteRef::Weighted(vec![WeightedSprite::new(1, 2u32)]));
        let mut r = renderer(vec![grass], vec![]);
        let c = cell(&[(CellSlot::Terrain, "t_grass")]);
        let effect = LevelEffect { y_offset: -8, brightness: 0.5, opacity: 0.25 };
        let prims = r.render_tile(&mut SpriteSelector::new(), 0, 0, &c, &NO_NEIGHBORS, effect).unwrap();
        let DrawPrimitive::Sprite { y, brightness, opacity, .. } = &prims[0] else {
            panic!("expected sprite");
        };
        assert_eq!((*y, *brightness, *opacity), (-8, 0.5, 0.25));
        assert_eq!(sprite_red(&prims[0]), 20);
    }

    #[test]
    fn test_season_parse_and_cache_clear() {
        let mut r = renderer(vec![simple("t_floor", 3)], vec![]);
        r.set_season("winter");
        assert_eq!(r.season(), Season::Winter);
        r.set_season("monsoon");
        assert_eq!(r.season(), Season::Spring);

        let c = cell(&[(CellSlot::Terrain, "t_floor")]);
        r.render_tile(&mut SpriteSelector::new(), 0, 0, &c, &NO_NEIGHBORS, LevelEffect::default()).unwrap();
        assert!(!r.sprite_transformer().is_empty());
        r.set_tileset("Test").unwrap();
        assert!(!r.sprite_transformer().is_empty());
    }
}
