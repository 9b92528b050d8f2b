// cleanurls/src/logger.rs
//! Logging setup for the cleanurls binary.
//!
//! Logs go to stderr so that cleaned URLs and generated code on stdout stay
//! pipeable. `RUST_LOG` is honoured unless a flag forces a level.
//! License: MIT OR APACHE 2.0

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Level used when neither `RUST_LOG` nor a flag says otherwise.
pub const DEFAULT_FILTER: &str = "warn";

/// Maps the `--quiet` / `--debug` flags to a forced level.
pub fn level_from_flags(quiet: bool, debug: bool) -> Option<LevelFilter> {
    if quiet {
        Some(LevelFilter::Error)
    } else if debug {
        Some(LevelFilter::Debug)
    } else {
        None
    }
}

/// Initializes the global logger. Calling it twice is harmless.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.target(Target::Stderr).format_timestamp(None);
    // Fails only when a logger is already installed.
    let _ = builder.try_init();
}
