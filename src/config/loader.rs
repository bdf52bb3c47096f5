//! Configuration loading and discovery for `tilesrc.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::TilesrcConfig;
use crate::models::Season;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name searched for during discovery.
pub const CONFIG_FILE_NAME: &str = "tilesrc.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse tilesrc.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override game root
    pub game: Option<PathBuf>,
    /// Override preferred tileset
    pub tileset: Option<String>,
    /// Override season
    pub season: Option<Season>,
    /// Override active mods (replaces the configured list when non-empty)
    pub mods: Vec<String>,
    /// Number of loading threads
    pub jobs: Option<usize>,
}

/// Find tilesrc.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for tilesrc.toml
/// 2. Check XDG_CONFIG_HOME/tilesrc/tilesrc.toml (or ~/.config/tilesrc/tilesrc.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find tilesrc.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("tilesrc").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find tilesrc.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a tilesrc.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the
/// default configuration.
///
/// A relative `game.path` is resolved against the directory holding the
/// config file.
///
/// # Example
/// ```ignore
/// let config = load_config(None)?;
/// let config = load_config(Some(Path::new("saves/tilesrc.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<TilesrcConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(default_config()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<TilesrcConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let mut config: TilesrcConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    if let Some(root) = path.parent() {
        config.game.path = resolve_path(root, &config.game.path);
    }
    tracing::debug!("Loaded config from {}", path.display());

    Ok(config)
}

/// Configuration used when no tilesrc.toml is found.
pub fn default_config() -> TilesrcConfig {
    TilesrcConfig::default()
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
///
/// # Example
/// ```ignore
/// let mut config = load_config(None)?;
/// let overrides = CliOverrides { jobs: Some(8), ..Default::default() };
/// merge_cli_overrides(&mut config, &overrides);
/// ```
pub fn merge_cli_overrides(config: &mut TilesrcConfig, overrides: &CliOverrides) {
    if let Some(ref game) = overrides.game {
        config.game.path = game.clone();
    }

    if let Some(ref tileset) = overrides.tileset {
        config.render.tileset = Some(tileset.clone());
    }

    if let Some(season) = overrides.season {
        config.render.season = season;
    }

    if !overrides.mods.is_empty() {
        config.mods.active = overrides.mods.clone();
    }

    if let Some(jobs) = overrides.jobs {
        config.loading.jobs = jobs.max(1);
    }
}

/// Resolve a path relative to a base directory. Absolute paths pass through.
pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
