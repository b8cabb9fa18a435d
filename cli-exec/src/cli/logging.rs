//! Log subscriber setup.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Install a stderr log subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `verbosity` picks the level.
/// Logs go to stderr so the program's stdout stays clean.
pub fn init_logging(verbosity: u8) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!(e).context("Failed to install log subscriber"))
}

const fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "cli_exec=debug",
        _ => "cli_exec=trace",
    }
}
