//! Logging setup for the command line tool.
//!
//! Logs go to stderr so the report on stdout stays clean. `RUST_LOG` wins
//! over the verbosity flag when it is set.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Maps `-v` occurrences to a default filter directive.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber. Calling it twice is a no-op.
pub fn init(verbosity: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
