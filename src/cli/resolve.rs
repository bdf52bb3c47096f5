//! Resolve command implementation

use std::fmt::Write as _;
use std::process::ExitCode;

use crate::game_data::ObjectResolver;
use crate::models::{Season, TileSource};
use crate::service::{normalize_color, TilesetService};

use super::{Session, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the resolve command
pub(crate) fn run_resolve(session: &Session, object_id: &str) -> ExitCode {
    let Some(tileset) = session.active_tileset() else {
        eprintln!("Error: No tilesets available");
        return ExitCode::from(EXIT_ERROR);
    };
    let priority = session.config.mod_priority();
    let report = describe_resolution(
        &session.service,
        session.game_data.as_ref(),
        &tileset,
        object_id,
        session.config.render.season,
        &priority,
    );
    print!("{}", report);
    ExitCode::from(EXIT_SUCCESS)
}

fn describe_source(out: &mut String, source: &TileSource, indent: &str) {
    if let Some(fg) = &source.fg {
        let _ = writeln!(out, "{}fg: {:?}", indent, fg);
    }
    if let Some(bg) = &source.bg {
        let _ = writeln!(out, "{}bg: {:?}", indent, bg);
    }
    let mut traits = Vec::new();
    if source.rotates {
        traits.push("rotates".to_string());
    }
    if source.multitile {
        traits.push("multitile".to_string());
    }
    if source.animated {
        traits.push("animated".to_string());
    }
    if source.height_3d != 0 {
        traits.push(format!("height_3d={}", source.height_3d));
    }
    if !traits.is_empty() {
        let _ = writeln!(out, "{}{}", indent, traits.join(", "));
    }
}

/// Human-readable account of how `object_id` resolves: game object,
/// matched tile and its mod, sheet style, sprites and subtiles, or the
/// fallback glyph when no tile matches. Follows `looks_like` once.
pub(crate) fn describe_resolution(
    service: &TilesetService,
    resolver: &dyn ObjectResolver,
    tileset: &str,
    object_id: &str,
    season: Season,
    priority: &[String],
) -> String {
    let mut out = String::new();
    let object = resolver.resolve(object_id, priority);
    let _ = writeln!(out, "{} in {} ({})", object_id, tileset, season.as_str());

    match &object {
        Some(object) => {
            let _ = writeln!(
                out,
                "  object: type {}, mod {}, symbol '{}', color {}",
                object.object_type,
                object.mod_id,
                object.symbol_for(season),
                object.color_for(season)
            );
            if !object.connect_groups.is_empty() {
                let groups: Vec<&str> = object.connect_groups.iter().map(String::as_str).collect();
                let _ = writeln!(out, "  connect groups: {}", groups.join(", "));
            }
        }
        None => {
            let _ = writeln!(out, "  object: not found in game data");
        }
    }

    let mut lookup_id = object_id.to_string();
    let mut tile = service.tiles().get_tile_with_season_and_priority(tileset, &lookup_id, season, priority);
    if tile.is_none() {
        if let Some(alias) = object.as_ref().and_then(|o| o.looks_like.clone()) {
            let _ = writeln!(out, "  looks_like: {}", alias);
            tile = service.tiles().get_tile_with_season_and_priority(tileset, &alias, season, priority);
            lookup_id = alias;
        }
    }

    let color = object.as_ref().map(|o| o.color_for(season).to_string()).unwrap_or_else(|| "white".into());
    let symbol = object.as_ref().map(|o| o.symbol_for(season).to_string()).unwrap_or_else(|| "?".into());

    match tile {
        Some(tile) => {
            let _ = writeln!(out, "  tile: {} (mod {}, sheet {})", tile.tile_id, tile.mod_id, tile.sheet_id);
            let resolved = service.resolve(tileset, &lookup_id, &color, &symbol, season, priority);
            let style = &resolved.style;
            let _ = writeln!(
                out,
                "  style: {}x{} offset ({}, {}) scale {}",
                style.sprite_width, style.sprite_height, style.sprite_offset_x, style.sprite_offset_y, style.pixelscale
            );
            describe_source(&mut out, &resolved.source, "  ");
            for sub in &resolved.source.additional_tiles {
                let _ = writeln!(out, "  subtile {}:", sub.id);
                describe_source(&mut out, sub, "    ");
            }
            let ids: Vec<String> = resolved.sprites.keys().map(|id| id.to_string()).collect();
            let _ = writeln!(out, "  sprites: {} loaded [{}]", ids.len(), ids.join(", "));
        }
        None => {
            let _ = writeln!(out, "  tile: none, fallback glyph '{}' in {}", symbol, normalize_color(&color));
        }
    }
    out
}
