//! Tilesrc - Library for resolving and rendering tiles from moddable tilesets
//!
//! This library provides functionality to:
//! - Load tilesets, mod tilesets and game data from a game directory
//! - Resolve game object ids to sprites with season and mod priority
//! - Pick connected-terrain subtiles, rotations and weighted variants
//! - Render maps across z-levels to positioned primitives and PNG images

pub mod animation;
pub mod cli;
pub mod config;
pub mod connectivity;
pub mod coords;
pub mod game_data;
pub mod loader;
pub mod logging;
pub mod map;
pub mod models;
pub mod placeholder;
pub mod registry;
pub mod renderer;
pub mod selector;
pub mod service;
pub mod sheet;
pub mod transform;
pub mod zlevel;
