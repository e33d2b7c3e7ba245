//! Core utilities and common types for plugboard.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::{LoaderConfig, LoggingConfig, RegistryConfig};
pub use error::{Error, Result};
pub use types::*;
