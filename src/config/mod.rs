//! Configuration for tilesrc
//!
//! Provides types and parsing for `tilesrc.toml`.

mod loader;
pub mod schema;

pub use loader::{
    default_config, find_config, find_config_from, find_xdg_config, load_config, merge_cli_overrides,
    resolve_path, CliOverrides, ConfigError, CONFIG_FILE_NAME,
};
pub use schema::*;
