//! Diagnostic logging setup.

use tracing::Level;

use crate::GlobalArgs;

/// Maps the global verbosity flags to a maximum log level.
pub fn level(global: &GlobalArgs) -> Level {
    if global.quiet {
        Level::WARN
    } else if global.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Installs a stderr `tracing` subscriber at the level selected by the flags.
pub fn init(global: &GlobalArgs) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level(global))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
