//! Thread-safe named-event dispatcher.

use crate::core::{Error, Result};
use crate::plugin::{PluginContext, PluginResult};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// A hook handler. Handlers for one event run sequentially in registration
/// order and the first error stops the chain.
pub type HookHandler = Arc<dyn Fn(&mut HookContext) -> PluginResult<()> + Send + Sync>;

/// Data handed to hook handlers.
#[derive(Clone, Debug, Default)]
pub struct HookContext {
    /// Execution context of the surrounding operation
    pub ctx: PluginContext,
    /// Free-form data shared between handlers
    pub data: HashMap<String, serde_json::Value>,
    /// Rendered markup fragments, for render events
    pub nodes: Vec<String>,
}

impl HookContext {
    /// Create a hook context for an execution context.
    pub fn new(ctx: PluginContext) -> Self {
        Self {
            ctx,
            data: HashMap::new(),
            nodes: Vec::new(),
        }
    }

    /// Add a data entry.
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data.insert(key.to_string(), value);
        self
    }

    /// Get a data entry.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Set a data entry.
    pub fn set(&mut self, key: &str, value: serde_json::Value) {
        self.data.insert(key.to_string(), value);
    }

    /// Name of the plugin a lifecycle event was fired for, if any.
    pub fn plugin(&self) -> Option<&str> {
        self.data.get("plugin").and_then(|v| v.as_str())
    }
}

/// Named-event pub/sub table.
#[derive(Default)]
pub struct HookManager {
    handlers: RwLock<HashMap<String, Vec<HookHandler>>>,
}

impl HookManager {
    /// Create an empty hook manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler for `event`.
    pub fn on<F>(&self, event: &str, handler: F)
    where
        F: Fn(&mut HookContext) -> PluginResult<()> + Send + Sync + 'static,
    {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        handlers
            .entry(event.to_string())
            .or_default()
            .push(Arc::new(handler));
    }

    /// Remove every handler for `event`.
    pub fn off(&self, event: &str) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(event);
    }

    /// Run the handlers registered for `event`.
    ///
    /// The handler list is snapshotted before the first handler runs, so
    /// handlers may register or remove hooks without deadlocking; such
    /// changes take effect on the next trigger.
    pub fn trigger(&self, event: &str, ctx: &mut HookContext) -> Result<()> {
        let handlers: Vec<HookHandler> = {
            let table = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
            match table.get(event) {
                Some(list) => list.clone(),
                None => return Ok(()),
            }
        };

        for (index, handler) in handlers.iter().enumerate() {
            if let Err(source) = handler(&mut *ctx) {
                debug!(event, index, error = %source, "hook handler failed");
                return Err(Error::Hook {
                    event: event.to_string(),
                    plugin: None,
                    source,
                });
            }
        }
        Ok(())
    }

    /// Whether any handler is registered for `event`.
    pub fn has(&self, event: &str) -> bool {
        self.count(event) > 0
    }

    /// Number of handlers registered for `event`.
    pub fn count(&self, event: &str) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event)
            .map_or(0, Vec::len)
    }

    /// Names of events that have at least one handler, sorted.
    pub fn events(&self) -> Vec<String> {
        let table = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = table
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for HookManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookManager")
            .field("events", &self.events())
            .finish()
    }
}
