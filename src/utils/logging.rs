//! Tracing subscriber setup.
//!
//! The library itself only emits `tracing` events; binaries and tests call
//! [`init_logging`] once to decide where they go.

use crate::config::LoggingConfig;
use crate::error::{Result, TxrepError};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a global subscriber for `config`. `RUST_LOG`, when set, takes
/// precedence over the configured level.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str().to_ascii_lowercase()));

    let installed = if config.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .try_init()
    };

    installed.map_err(|e| TxrepError::ConfigError(format!("Failed to install logger: {e}")))?;
    tracing::debug!(app = %config.app_name, "logging initialised");
    Ok(())
}
