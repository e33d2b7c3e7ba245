//! Plugin lifecycle orchestration.
//!
//! `initialize` brings plugins up in dependency order and stops at the first
//! failure. `shutdown` tears the recorded order down in reverse and keeps
//! going past failures.

use crate::core::{now, Error, Result, Timestamp};
use crate::hooks::{events, HookContext};
use crate::plugin::{Plugin, PluginContext};
use crate::registry::Registry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Plugin runtime state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginState {
    Registered,
    Initialized,
    ShutDown,
    Failed,
}

/// A lifecycle transition for a plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub plugin_name: String,
    pub from_state: PluginState,
    pub to_state: PluginState,
    pub timestamp: Timestamp,
    pub error: Option<String>,
}

/// Tracks the lifecycle state of plugins.
#[derive(Debug, Clone, Default)]
pub struct LifecycleTracker {
    states: HashMap<String, PluginState>,
    events: Vec<LifecycleEvent>,
    /// Names currently initialized, in the order they came up
    initialized: Vec<String>,
}

impl LifecycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transition(&mut self, plugin_name: &str, to_state: PluginState, error: Option<String>) {
        let from_state = self.state_of(plugin_name);
        self.states.insert(plugin_name.to_string(), to_state);

        self.initialized.retain(|name| name != plugin_name);
        if to_state == PluginState::Initialized {
            self.initialized.push(plugin_name.to_string());
        }

        self.events.push(LifecycleEvent {
            plugin_name: plugin_name.into(),
            from_state,
            to_state,
            timestamp: now(),
            error,
        });
    }

    pub fn state_of(&self, plugin_name: &str) -> PluginState {
        self.states
            .get(plugin_name)
            .copied()
            .unwrap_or(PluginState::Registered)
    }

    pub fn events_for(&self, plugin_name: &str) -> Vec<LifecycleEvent> {
        self.events
            .iter()
            .filter(|e| e.plugin_name == plugin_name)
            .cloned()
            .collect()
    }

    /// Initialized plugins, in the order they came up.
    pub fn initialized(&self) -> &[String] {
        &self.initialized
    }

    /// Drop the current state of a plugin; its event history is kept.
    pub fn forget(&mut self, plugin_name: &str) {
        self.states.remove(plugin_name);
        self.initialized.retain(|name| name != plugin_name);
    }
}

impl Registry {
    /// Resolve, sort and initialize every registered plugin.
    ///
    /// For each plugin in dependency order this fires `before_init`, calls
    /// `Plugin::init` and fires `after_init`. The first failure aborts the
    /// run. Plugins initialized before the failure stay initialized unless
    /// `rollback_on_failure` is configured, in which case the plugins this
    /// call started are shut down again; see
    /// [`Registry::is_partially_initialized`] and [`Registry::rollback`].
    ///
    /// Plugins already initialized by an earlier partial run are not
    /// initialized twice.
    pub async fn initialize(&self, ctx: &PluginContext) -> Result<()> {
        self.resolve_dependencies()?;
        let order = self.topological_sort()?;
        info!(plugins = order.len(), "initializing plugins");

        let mut brought_up: Vec<Arc<dyn Plugin>> = Vec::with_capacity(order.len());
        // Started by this call; earlier runs still own the rest of `brought_up`.
        let mut started: Vec<Arc<dyn Plugin>> = Vec::new();
        for plugin in order {
            let name = plugin.name().to_string();
            if self.state_of(&name) == PluginState::Initialized {
                debug!(plugin = %name, "already initialized");
                brought_up.push(plugin);
                continue;
            }

            if let Err(err) = self.init_plugin(ctx, &plugin).await {
                error!(plugin = %name, error = %err, "plugin initialization failed");
                self.transition(&name, PluginState::Failed, Some(err.to_string()));
                if self.config.rollback_on_failure {
                    let failures = self.shutdown_sequence(ctx, &started).await;
                    for failure in &failures {
                        warn!(error = %failure, "rollback step failed");
                    }
                }
                return Err(err);
            }

            self.transition(&name, PluginState::Initialized, None);
            started.push(Arc::clone(&plugin));
            brought_up.push(plugin);
        }

        info!(plugins = brought_up.len(), "all plugins initialized");
        self.write().init_order = brought_up;
        Ok(())
    }

    /// Shut down the plugins recorded by the last successful `initialize`,
    /// in reverse order.
    ///
    /// Every plugin is attempted even if hooks or earlier plugins fail; all
    /// failures are returned together as [`Error::ShutdownFailed`]. Without
    /// a recorded order this does nothing.
    pub async fn shutdown(&self, ctx: &PluginContext) -> Result<()> {
        let order = self.take_init_order();
        if order.is_empty() {
            debug!("no initialized plugins to shut down");
            return Ok(());
        }

        info!(plugins = order.len(), "shutting down plugins");
        let failures = self.shutdown_sequence(ctx, &order).await;
        if failures.is_empty() {
            info!("all plugins shut down");
            Ok(())
        } else {
            warn!(failures = failures.len(), "shutdown finished with errors");
            Err(Error::ShutdownFailed(failures))
        }
    }

    /// Shut down every plugin that is currently initialized, newest first.
    ///
    /// Meant for cleaning up after a failed `initialize`. Reports failures the
    /// same way as [`Registry::shutdown`].
    pub async fn rollback(&self, ctx: &PluginContext) -> Result<()> {
        let plugins: Vec<Arc<dyn Plugin>> = self
            .initialized_plugins()
            .iter()
            .filter_map(|name| self.get(name))
            .collect();
        self.take_init_order();

        let failures = self.shutdown_sequence(ctx, &plugins).await;
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::ShutdownFailed(failures))
        }
    }

    /// Current lifecycle state of a plugin.
    pub fn state_of(&self, name: &str) -> PluginState {
        self.read().lifecycle.state_of(name)
    }

    /// Lifecycle transitions recorded for a plugin.
    pub fn lifecycle_events(&self, name: &str) -> Vec<LifecycleEvent> {
        self.read().lifecycle.events_for(name)
    }

    /// Names of initialized plugins, in the order they came up.
    pub fn initialized_plugins(&self) -> Vec<String> {
        self.read().lifecycle.initialized().to_vec()
    }

    /// Order recorded by the last successful `initialize`.
    pub fn init_order(&self) -> Vec<String> {
        self.read()
            .init_order
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// True when some plugins are initialized but `initialize` did not
    /// complete, so `shutdown` would not reach them.
    pub fn is_partially_initialized(&self) -> bool {
        let inner = self.read();
        inner.init_order.is_empty() && !inner.lifecycle.initialized().is_empty()
    }

    async fn init_plugin(&self, ctx: &PluginContext, plugin: &Arc<dyn Plugin>) -> Result<()> {
        let name = plugin.name();
        self.fire(events::BEFORE_INIT, ctx, name)?;
        debug!(plugin = %name, version = plugin.version(), "initializing plugin");
        plugin
            .init(ctx, self)
            .await
            .map_err(|source| Error::Init {
                plugin: name.to_string(),
                source,
            })?;
        self.fire(events::AFTER_INIT, ctx, name)
    }

    /// Shut `plugins` down in reverse order, collecting every failure.
    async fn shutdown_sequence(
        &self,
        ctx: &PluginContext,
        plugins: &[Arc<dyn Plugin>],
    ) -> Vec<Error> {
        let mut failures = Vec::new();
        for plugin in plugins.iter().rev() {
            let name = plugin.name();

            if let Err(err) = self.fire(events::BEFORE_SHUTDOWN, ctx, name) {
                warn!(plugin = %name, error = %err, "before_shutdown hook failed");
                failures.push(err);
            }

            debug!(plugin = %name, "shutting down plugin");
            match plugin.shutdown(ctx).await {
                Ok(()) => self.transition(name, PluginState::ShutDown, None),
                Err(source) => {
                    warn!(plugin = %name, error = %source, "plugin shutdown failed");
                    self.transition(name, PluginState::Failed, Some(source.to_string()));
                    failures.push(Error::Shutdown {
                        plugin: name.to_string(),
                        source,
                    });
                }
            }

            if let Err(err) = self.fire(events::AFTER_SHUTDOWN, ctx, name) {
                warn!(plugin = %name, error = %err, "after_shutdown hook failed");
                failures.push(err);
            }
        }
        failures
    }

    fn fire(&self, event: &str, ctx: &PluginContext, plugin: &str) -> Result<()> {
        let mut hook_ctx =
            HookContext::new(ctx.clone()).with_data("plugin", serde_json::json!(plugin));
        self.hooks
            .trigger(event, &mut hook_ctx)
            .map_err(|e| e.for_plugin(plugin))
    }

    fn transition(&self, name: &str, to_state: PluginState, error: Option<String>) {
        let mut inner = self.write();
        // Unregistered mid-run: keep no state for it.
        if inner.plugins.contains_key(name) {
            inner.lifecycle.transition(name, to_state, error);
        }
    }

    fn take_init_order(&self) -> Vec<Arc<dyn Plugin>> {
        std::mem::take(&mut self.write().init_order)
    }
}
