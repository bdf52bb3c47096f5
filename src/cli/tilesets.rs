//! Tilesets command implementation

use std::fmt::Write as _;
use std::process::ExitCode;

use crate::service::TilesetService;

use super::{Session, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the tilesets command
pub(crate) fn run_tilesets(session: &Session) -> ExitCode {
    if session.service.available_tilesets().is_empty() {
        eprintln!("Error: No tilesets found under {}", session.config.game.path.join("gfx").display());
        return ExitCode::from(EXIT_ERROR);
    }
    print!("{}", format_tilesets(&session.service));
    ExitCode::from(EXIT_SUCCESS)
}

/// One block per tileset: names, grid, projection, then per-mod counts.
pub(crate) fn format_tilesets(service: &TilesetService) -> String {
    let mut out = String::new();
    for tileset in service.available_tilesets() {
        let name = &tileset.folder_name;
        let (width, height) = tileset.tile_size();
        let _ = writeln!(out, "{} ({})", name, tileset.view_name);
        let _ = writeln!(out, "  short name:  {}", tileset.short_name);
        let _ = writeln!(
            out,
            "  grid:        {}x{} (z height {}, scale {})",
            width, height, tileset.grid_z_height, tileset.pixelscale
        );
        let _ = writeln!(out, "  projection:  {}", if tileset.is_iso { "isometric" } else { "orthogonal" });
        let _ = writeln!(
            out,
            "  sheets:      {} ({} sprites){}",
            service.sheets().sheet_count(name),
            service.sheets().sprite_count(name),
            if service.tileset_has_real_sprites(name) { "" } else { ", fallback only" }
        );
        for (mod_id, stats) in service.mod_statistics(name) {
            let _ = writeln!(out, "  mod {:<12} {} sheets, {} tiles", mod_id, stats.sheets, stats.tiles);
        }
    }
    out
}
