//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod render;
mod resolve;
mod tilesets;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use crate::config::{load_config, merge_cli_overrides, CliOverrides, TilesrcConfig};
use crate::game_data::GameDataStore;
use crate::loader::LoadReport;
use crate::models::Season;
use crate::service::TilesetService;

/// Process exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Tilesrc - resolve and render tiles from moddable game tilesets
#[derive(Parser)]
#[command(name = "tilesrc")]
#[command(about = "Tilesrc - resolve game objects to tileset sprites and render scenes to PNG")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Game root containing gfx/ and data/
    #[arg(long, global = true)]
    pub game: Option<PathBuf>,

    /// Preferred tileset (folder or short name)
    #[arg(long, global = true)]
    pub tileset: Option<String>,

    /// Season for seasonal variants (spring, summer, autumn, winter)
    #[arg(long, global = true)]
    pub season: Option<Season>,

    /// Active mod, highest priority first (repeatable)
    #[arg(long = "mod", global = true)]
    pub mods: Vec<String>,

    /// Worker threads for loading
    #[arg(long, global = true, value_parser = clap::value_parser!(usize))]
    pub jobs: Option<usize>,

    /// Path to tilesrc.toml (default: discovered)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List loaded tilesets with grid size, projection, sheets and mods
    Tilesets,
    /// Show how an object id resolves in the active tileset
    Resolve {
        /// Game object id, e.g. t_wall or f_chair
        object_id: String,
    },
    /// Render a scene file to PNG
    Render {
        /// Scene JSON: `rows` plus per-layer symbol palettes
        scene: PathBuf,

        /// Output PNG
        #[arg(short, long)]
        output: PathBuf,

        /// Current z-level (default: the scene's lowest level)
        #[arg(long, allow_negative_numbers = true)]
        z: Option<i32>,

        /// Transparent padding around the rendered scene in pixels
        #[arg(long, default_value = "4")]
        padding: u32,
    },
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            game: self.game.clone(),
            tileset: self.tileset.clone(),
            season: self.season,
            mods: self.mods.clone(),
            jobs: self.jobs,
        }
    }
}

/// Everything a command needs after startup loading.
pub(crate) struct Session {
    pub config: TilesrcConfig,
    pub service: Arc<TilesetService>,
    pub game_data: Arc<GameDataStore>,
}

impl Session {
    /// Name of the tileset commands operate on.
    pub fn active_tileset(&self) -> Option<String> {
        self.service
            .preferred_tileset(self.config.render.tileset.as_deref(), self.config.render.iso)
            .ok()
            .map(|ts| ts.folder_name.clone())
    }
}

/// Load the config, apply CLI flags and load tilesets plus game data.
fn start_session(cli: &Cli) -> Result<Session, u8> {
    if cli.jobs == Some(0) {
        eprintln!("Error: --jobs must be at least 1");
        return Err(EXIT_INVALID_ARGS);
    }

    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(EXIT_ERROR);
        }
    };
    merge_cli_overrides(&mut config, &cli.overrides());

    let game_path = config.game.path.clone();
    if !game_path.is_dir() {
        eprintln!("Error: Game directory not found: {}", game_path.display());
        return Err(EXIT_ERROR);
    }
    let jobs = config.loading.jobs;

    let (service, service_report) = match TilesetService::load(&game_path, jobs) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(EXIT_ERROR);
        }
    };
    let (game_data, data_report) = match GameDataStore::load(&game_path, jobs) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(EXIT_ERROR);
        }
    };

    let mut report = LoadReport::default();
    report.merge(service_report);
    report.merge(data_report);
    tracing::info!(
        "Loaded {} tilesets, {} sheets, {} tiles ({} warnings)",
        report.tilesets,
        report.sheets,
        report.tiles,
        report.warnings.len()
    );

    Ok(Session { config, service: Arc::new(service), game_data: Arc::new(game_data) })
}

/// Parse arguments and run the selected command.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    crate::logging::init(cli.verbose);

    let session = match start_session(&cli) {
        Ok(session) => session,
        Err(code) => return ExitCode::from(code),
    };

    match cli.command {
        Commands::Tilesets => tilesets::run_tilesets(&session),
        Commands::Resolve { object_id } => resolve::run_resolve(&session, &object_id),
        Commands::Render { scene, output, z, padding } => render::run_render(&session, &scene, &output, z, padding),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "tilesrc", "render", "scene.json", "-o", "out.png", "--z", "-1", "--season", "winter", "--mod", "a",
            "--mod", "b", "--jobs", "2",
        ])
        .expect("should parse");
        assert_eq!(cli.season, Some(Season::Winter));
        assert_eq!(cli.mods, vec!["a", "b"]);
        assert_eq!(cli.jobs, Some(2));
        match cli.command {
            Commands::Render { z, padding, .. } => {
                assert_eq!(z, Some(-1));
                assert_eq!(padding, 4);
            }
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn test_invalid_season_rejected() {
        let result = Cli::try_parse_from(["tilesrc", "tilesets", "--season", "monsoon"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_from_flags() {
        let cli = Cli::try_parse_from(["tilesrc", "resolve", "t_wall", "--tileset", "Chibi", "--game", "/g"])
            .expect("should parse");
        let overrides = cli.overrides();
        assert_eq!(overrides.tileset.as_deref(), Some("Chibi"));
        assert_eq!(overrides.game, Some(PathBuf::from("/g")));
        assert!(overrides.mods.is_empty());
    }
}
