//! Error types for plugboard.

use crate::plugin::PluginError;
use thiserror::Error;

/// Result type alias for plugboard operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in registry, resolution and lifecycle operations.
#[derive(Error, Debug)]
pub enum Error {
    // Registration errors
    #[error("plugin name cannot be empty")]
    EmptyName,

    #[error("plugin {0} is already registered")]
    DuplicatePlugin(String),

    #[error("plugin {0} not found")]
    PluginNotFound(String),

    // Version errors
    #[error("invalid version {input:?}: {reason}")]
    InvalidVersion { input: String, reason: String },

    #[error("invalid version constraint {input:?}: {reason}")]
    InvalidConstraint { input: String, reason: String },

    // Dependency errors
    #[error("plugin {plugin} requires {dependency}, which is not registered")]
    MissingDependency { plugin: String, dependency: String },

    #[error("plugin {plugin} requires {dependency} {required}, but version {found} is registered")]
    VersionMismatch {
        plugin: String,
        dependency: String,
        required: String,
        found: String,
    },

    #[error("circular dependency detected")]
    CircularDependency,

    // Lifecycle errors
    #[error("plugin {plugin} failed to initialize: {source}")]
    Init {
        plugin: String,
        #[source]
        source: PluginError,
    },

    #[error("plugin {plugin} failed to shut down: {source}")]
    Shutdown {
        plugin: String,
        #[source]
        source: PluginError,
    },

    #[error("hook {event} failed{}: {source}", plugin_suffix(.plugin))]
    Hook {
        event: String,
        plugin: Option<String>,
        #[source]
        source: PluginError,
    },

    #[error("shutdown finished with {} error(s): {}", .0.len(), join_errors(.0))]
    ShutdownFailed(Vec<Error>),

    // Loader errors
    #[error("failed to load plugin from {path}: {reason}")]
    Load { path: String, reason: String },

    // Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Attribute a hook failure to the plugin whose lifecycle step fired it.
    pub(crate) fn for_plugin(self, name: &str) -> Self {
        match self {
            Error::Hook { event, source, .. } => Error::Hook {
                event,
                plugin: Some(name.to_string()),
                source,
            },
            other => other,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

fn plugin_suffix(plugin: &Option<String>) -> String {
    match plugin {
        Some(name) => format!(" for plugin {}", name),
        None => String::new(),
    }
}

fn join_errors(errors: &[Error]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
