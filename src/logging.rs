//! Logging bootstrap for applications embedding the compiler.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ConfigError;

/// Installs a global `fmt` subscriber filtered by `level` (an `EnvFilter`
/// directive such as `"neoquery=debug"`).
pub fn init_logging(level: &str) -> Result<(), ConfigError> {
    fmt()
        .with_env_filter(
            EnvFilter::try_new(level)
                .map_err(|e| ConfigError::Logging(format!("invalid filter '{level}': {e}")))?,
        )
        .with_target(true)
        .with_thread_ids(true)
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))
}
