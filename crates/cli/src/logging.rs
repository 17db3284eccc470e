//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Logs always go to stderr so JSON written to stdout stays parseable.
//! Without `-v` nothing is logged unless `RUST_LOG` asks for it; the
//! diagnostics themselves are already rendered by the command.

use std::io::{self, IsTerminal};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub(crate) struct LogConfig {
    /// Level for the odontogram crates; `None` disables logging.
    pub(crate) level: Option<Level>,
    /// Whether to use ANSI colors in output.
    pub(crate) with_ansi: bool,
}

impl LogConfig {
    /// Create a `LogConfig` from the `-v` count.
    ///
    /// - 0: off
    /// - 1 (`-v`): info
    /// - 2 (`-vv`): debug
    /// - 3+ (`-vvv`): trace
    pub(crate) fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => None,
            1 => Some(Level::INFO),
            2 => Some(Level::DEBUG),
            _ => Some(Level::TRACE),
        };
        Self {
            level,
            with_ansi: io::stderr().is_terminal(),
        }
    }
}

/// Install the global subscriber. Call once at startup.
pub(crate) fn init_logging(config: &LogConfig) {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(false)
        .without_time();
    // try_init fails only when a subscriber is already installed.
    let _ = tracing_subscriber::registry()
        .with(build_env_filter(config.level))
        .with(layer)
        .try_init();
}

fn build_env_filter(level: Option<Level>) -> EnvFilter {
    // RUST_LOG overrides the verbosity flags.
    EnvFilter::try_from_default_env().unwrap_or_else(|_| match level {
        None => EnvFilter::new("off"),
        Some(level) => {
            let level = level.as_str().to_lowercase();
            EnvFilter::new(format!(
                "warn,odontogram_core={level},odontogram_cli={level}"
            ))
        }
    })
}
