//! Configuration schema types for `tilesrc.toml`
//!
//! Every section is optional; a missing file or section means defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::loader::DEFAULT_JOBS;
use crate::models::{Season, CORE_MOD};
use crate::zlevel::ZLevelSettings;

/// Where the game lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Game root: `gfx/` and `data/` live under it
    #[serde(default = "default_game_path")]
    pub path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self { path: default_game_path() }
    }
}

fn default_game_path() -> PathBuf {
    PathBuf::from(".")
}

/// Mod priority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModsConfig {
    /// Preferred mods, highest priority first
    #[serde(default = "default_active_mods")]
    pub active: Vec<String>,
}

impl Default for ModsConfig {
    fn default() -> Self {
        Self { active: default_active_mods() }
    }
}

fn default_active_mods() -> Vec<String> {
    vec![CORE_MOD.to_string()]
}

/// Tile rendering preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Preferred tileset by folder or short name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tileset: Option<String>,
    /// Preferred projection when no tileset is named
    #[serde(default)]
    pub iso: bool,
    #[serde(default)]
    pub season: Season,
    /// Prefer `<id>_transparent` variants that have real art
    #[serde(default)]
    pub transparency: bool,
}

/// Animation timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Requested tick interval in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self { interval_ms: default_interval_ms() }
    }
}

fn default_interval_ms() -> u64 {
    100
}

/// Startup loading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingConfig {
    /// Worker threads for tileset and game-data loading
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self { jobs: default_jobs() }
    }
}

fn default_jobs() -> usize {
    DEFAULT_JOBS
}

/// Root of `tilesrc.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TilesrcConfig {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub mods: ModsConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub zlevel: ZLevelSettings,
    #[serde(default)]
    pub loading: LoadingConfig,
}

/// A single validation problem
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Dotted path to the field, e.g. `loading.jobs`
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tilesrc.toml: '{}' {}", self.field, self.message)
    }
}

impl TilesrcConfig {
    /// Validate the configuration and return every problem found
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.animation.interval_ms == 0 {
            errors.push(ConfigValidationError {
                field: "animation.interval_ms".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        if self.loading.jobs == 0 {
            errors.push(ConfigValidationError {
                field: "loading.jobs".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.mods.active.iter().any(|m| m.trim().is_empty()) {
            errors.push(ConfigValidationError {
                field: "mods.active".to_string(),
                message: "must not contain empty mod ids".to_string(),
            });
        }

        for problem in self.zlevel.validate() {
            let (field, message) = problem.split_once(' ').unwrap_or((problem.as_str(), ""));
            errors.push(ConfigValidationError { field: field.to_string(), message: message.to_string() });
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Mod priority for lookups: the active list with the base game last.
    pub fn mod_priority(&self) -> Vec<String> {
        crate::game_data::mod_priority(&self.mods.active)
    }
}
