//! Registry configuration.
//!
//! All sections deserialize with defaults, so a partial JSON document is valid.

use crate::core::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level registry configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Shut down already-initialized plugins when `initialize` fails part way
    pub rollback_on_failure: bool,
    /// Logging settings
    pub logging: LoggingConfig,
    /// Plugin directory settings for the loader
    pub loader: Option<LoaderConfig>,
}

impl RegistryConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Enable rollback of partially initialized plugins.
    pub fn with_rollback(mut self, enabled: bool) -> Self {
        self.rollback_on_failure = enabled;
        self
    }

    /// Set the loader configuration.
    pub fn with_loader(mut self, loader: LoaderConfig) -> Self {
        self.loader = Some(loader);
        self
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `plugboard=debug`
    pub filter: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Plugin loader configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Directory scanned for plugin units
    pub directory: PathBuf,
    /// File extension of plugin units, without the dot
    pub extension: String,
}

impl LoaderConfig {
    /// Create a loader config for a directory with the platform extension.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Default::default()
        }
    }

    /// Override the plugin file extension.
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("plugins"),
            extension: std::env::consts::DLL_EXTENSION.to_string(),
        }
    }
}
