//! Plugin interface definition.
//!
//! Defines the contract every plugin implements, the dependency declaration
//! format and the context handed to lifecycle methods.

use crate::plugin::capability::{
    AssetProvider, ComponentProvider, MiddlewareProvider, ThemeProvider,
};
use crate::registry::Registry;
use crate::version::satisfies;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A dependency one plugin declares on another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Name of the required plugin
    pub name: String,
    /// Version constraint, e.g. `^1.2.0`; empty or `*` accepts any version
    pub version: String,
    /// Missing optional dependencies are ignored
    #[serde(default)]
    pub optional: bool,
}

impl Dependency {
    /// Declare a required dependency.
    pub fn required(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            optional: false,
        }
    }

    /// Declare an optional dependency.
    pub fn optional(name: &str, version: &str) -> Self {
        Self {
            optional: true,
            ..Self::required(name, version)
        }
    }

    /// Check a concrete version against this dependency's constraint.
    pub fn is_satisfied_by(&self, version: &str) -> bool {
        satisfies(&self.version, version)
    }
}

/// Context passed to plugin lifecycle methods and hook handlers.
///
/// Cloning is cheap and clones share the cancellation token. The registry
/// never checks for cancellation itself.
#[derive(Clone, Debug, Default)]
pub struct PluginContext {
    /// Configuration
    pub config: HashMap<String, serde_json::Value>,
    cancel: CancellationToken,
}

impl PluginContext {
    /// Create a new context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context driven by an existing cancellation token.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            config: HashMap::new(),
            cancel: token,
        }
    }

    /// Get config value.
    pub fn get_config<T: for<'de> serde::Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.config.get(key).and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Set config value.
    pub fn set_config(&mut self, key: &str, value: serde_json::Value) {
        self.config.insert(key.to_string(), value);
    }

    /// The token plugins should watch for cancellation.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Request cancellation of work running under this context.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Derive a context whose token is cancelled with this one but can also
    /// be cancelled on its own.
    pub fn child(&self) -> Self {
        Self {
            config: self.config.clone(),
            cancel: self.cancel.child_token(),
        }
    }
}

/// Result type for plugin-authored operations.
pub type PluginResult<T> = std::result::Result<T, PluginError>;

/// Error returned by plugin lifecycle methods and hook handlers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluginError {
    /// Error message
    pub message: String,
    /// Is recoverable
    pub recoverable: bool,
}

impl PluginError {
    /// Create a new error.
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            recoverable: true,
        }
    }

    /// Create a fatal error.
    pub fn fatal(message: &str) -> Self {
        Self {
            message: message.to_string(),
            recoverable: false,
        }
    }

    /// Error for work abandoned because the context was cancelled.
    pub fn cancelled() -> Self {
        Self::new("cancelled")
    }
}

impl std::fmt::Display for PluginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for PluginError {}

impl From<String> for PluginError {
    fn from(message: String) -> Self {
        Self {
            message,
            recoverable: true,
        }
    }
}

impl From<&str> for PluginError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Plugin trait that all plugins must implement.
///
/// Specialized capabilities are exposed through the `as_*_provider` methods.
/// The registry calls each of them exactly once, at registration, and keeps
/// the returned handles in its capability indexes. A plugin implementing
/// e.g. [`ThemeProvider`] opts in with:
///
/// ```ignore
/// fn as_theme_provider(self: Arc<Self>) -> Option<Arc<dyn ThemeProvider>> {
///     Some(self)
/// }
/// ```
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Unique, non-empty plugin name.
    fn name(&self) -> &str;

    /// Version as `major.minor.patch`, optionally prefixed with `v`.
    fn version(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str {
        ""
    }

    /// Plugins that must be initialized before this one.
    fn dependencies(&self) -> Vec<Dependency> {
        Vec::new()
    }

    /// Initialize the plugin. Dependencies are already initialized.
    async fn init(&self, ctx: &PluginContext, registry: &Registry) -> PluginResult<()>;

    /// Shutdown the plugin. Dependents are already shut down.
    async fn shutdown(&self, ctx: &PluginContext) -> PluginResult<()>;

    fn as_component_provider(self: Arc<Self>) -> Option<Arc<dyn ComponentProvider>> {
        None
    }

    fn as_asset_provider(self: Arc<Self>) -> Option<Arc<dyn AssetProvider>> {
        None
    }

    fn as_theme_provider(self: Arc<Self>) -> Option<Arc<dyn ThemeProvider>> {
        None
    }

    fn as_middleware_provider(self: Arc<Self>) -> Option<Arc<dyn MiddlewareProvider>> {
        None
    }
}
