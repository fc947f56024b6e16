//! Logging set up for the command line driver
//!
//! The library only emits `tracing` events; installing a subscriber
//! is left to the binary. `RUST_LOG` overrides the verbosity flag.

use std::io;

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// Level corresponding to a count of `-v` flags
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install a stderr subscriber. Subsequent calls do nothing.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "pairgc={}",
            level_for(verbosity).as_str().to_lowercase()
        ))
    });

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
