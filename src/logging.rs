//! Log output setup for the `tilesrc` binary.
//!
//! Library code only emits `tracing` events; installing a subscriber is
//! left to the binary.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "tilesrc=debug"
    } else {
        "tilesrc=info"
    }
}

/// Install a stderr formatter filtered by `RUST_LOG`, falling back to
/// [`default_directive`]. Calling it twice is harmless.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}
