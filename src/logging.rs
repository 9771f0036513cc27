//! Structured logging setup.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g. `stalewatch=debug`.
pub const LOG_ENV: &str = "STALEWATCH_LOG";

/// Install the global subscriber. `STALEWATCH_LOG` wins over `verbose`.
pub fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}
