//! Tileset and mod-tileset loading.
//!
//! Parsing and image decoding are pure functions over the file system and
//! can run on worker threads. Their results are plain values that the
//! caller merges into the shared registries on its own thread.
//!
//! Loading is lenient: a malformed file, sheet or tile definition becomes a
//! [`Warning`] and is skipped. Only a missing root directory is an error.

mod discovery;
mod mods;
mod tileset;

use std::path::PathBuf;
use thiserror::Error;

pub use discovery::{discover_json_files, discover_mod_dirs, discover_tileset_dirs, find_gfx_dir};
pub use mods::{load_mod_tilesets, parse_mod_tileset_file, ModTileset};
pub use tileset::{decode_sheet, decode_sheets, parse_sheet_tiles, read_tileset, DecodedSheet};

use crate::models::Warning;

/// Default worker count for tileset loading.
pub const DEFAULT_JOBS: usize = 4;

/// Error while loading tileset content.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Path not found: {0}")]
    NotFound(PathBuf),
    #[error("No tile config found in {0}")]
    MissingTileConfig(PathBuf),
    #[error("Malformed content in {path}: {message}")]
    Malformed { path: PathBuf, message: String },
    #[error("Failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Summary of a load pass.
#[derive(Debug, Default, Clone)]
pub struct LoadReport {
    pub tilesets: usize,
    pub sheets: usize,
    pub tiles: usize,
    pub warnings: Vec<Warning>,
}

impl LoadReport {
    /// Record a warning and log it.
    pub fn warn(&mut self, message: impl Into<String>) {
        let warning = Warning::new(message);
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn extend_warnings(&mut self, warnings: impl IntoIterator<Item = Warning>) {
        for warning in warnings {
            tracing::warn!("{}", warning);
            self.warnings.push(warning);
        }
    }

    pub fn merge(&mut self, other: LoadReport) {
        self.tilesets += other.tilesets;
        self.sheets += other.sheets;
        self.tiles += other.tiles;
        self.warnings.extend(other.warnings);
    }
}
