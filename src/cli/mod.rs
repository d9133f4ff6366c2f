//! Command Line Interface for docclass.

pub mod args;
pub mod commands;
pub mod output;

use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// Re-export commonly used types
pub use args::*;
pub use commands::*;
pub use output::*;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "DOCCLASS_LOG";

static INIT: Once = Once::new();

/// Default log filter for a verbosity level.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "docclass=error",
        1 => "docclass=warn",
        2 => "docclass=info",
        _ => "docclass=debug",
    }
}

/// Install the stderr tracing subscriber.
///
/// Reads the filter from `DOCCLASS_LOG` (`EnvFilter` syntax, e.g.
/// `docclass::store=debug`) and falls back to [`default_filter`]. Idempotent.
pub fn init_tracing(verbosity: u8) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_line_number(verbosity >= 3),
            )
            .with(filter)
            .init();
    });
}
