//! Tilesrc - Command-line tool for inspecting tilesets and rendering scenes

use std::process::ExitCode;

use tilesrc::cli;

fn main() -> ExitCode {
    cli::run()
}
