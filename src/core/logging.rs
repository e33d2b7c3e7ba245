//! Tracing subscriber setup.
//!
//! The library only emits `tracing` events; hosts that have no subscriber of
//! their own can install one here.

use crate::core::{Error, LoggingConfig, Result};
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber according to `config`.
///
/// `RUST_LOG` takes precedence over `config.filter` when set. Fails if a
/// global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| Error::Config(format!("invalid log filter {:?}: {}", config.filter, e)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| Error::Config(format!("failed to install subscriber: {}", e)))
}
