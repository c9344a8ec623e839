//! Log subscriber setup

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Verbosity;
use crate::error::{CliError, CliResult};

/// Filter from `RUST_LOG`, falling back to the verbosity flags
#[must_use]
pub fn env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()))
}

/// Install a compact stderr subscriber
pub fn init(verbosity: Verbosity, color: bool) -> CliResult<()> {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_ansi(color)
                .with_writer(std::io::stderr),
        )
        .with(env_filter(verbosity))
        .try_init()
        .map_err(|e| CliError::config(format!("cannot install log subscriber: {e}")))
}
