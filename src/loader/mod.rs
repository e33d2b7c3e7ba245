//! Loader Module
//!
//! Discovers plugin units in a directory and registers them. Turning a file
//! into a plugin is platform specific and left to an injected
//! [`PluginFactory`].

use crate::core::{Error, LoaderConfig, Result};
use crate::plugin::Plugin;
use crate::registry::Registry;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Produces a plugin from a discovered file.
pub trait PluginFactory: Send + Sync {
    /// Instantiate the plugin stored at `path`.
    fn instantiate(&self, path: &Path) -> Result<Arc<dyn Plugin>>;
}

impl<F> PluginFactory for F
where
    F: Fn(&Path) -> Result<Arc<dyn Plugin>> + Send + Sync,
{
    fn instantiate(&self, path: &Path) -> Result<Arc<dyn Plugin>> {
        self(path)
    }
}

/// Registers every plugin unit found in a directory.
pub struct PluginLoader<F> {
    config: LoaderConfig,
    factory: F,
}

impl<F: PluginFactory> PluginLoader<F> {
    /// Create a loader.
    pub fn new(config: LoaderConfig, factory: F) -> Self {
        Self { config, factory }
    }

    /// Loader configuration.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Plugin files in the configured directory, sorted by path.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        for entry in std::fs::read_dir(&self.config.directory)? {
            let path = entry?.path();
            if path.is_file() && self.matches_extension(&path) {
                found.push(path);
            }
        }
        found.sort();
        debug!(
            directory = %self.config.directory.display(),
            count = found.len(),
            "discovered plugin files"
        );
        Ok(found)
    }

    /// Load and register every discovered plugin, stopping at the first error.
    ///
    /// Returns the number of plugins registered.
    pub fn load(&self, registry: &Registry) -> Result<usize> {
        let paths = self.discover()?;
        for path in &paths {
            self.load_one(registry, path)?;
        }
        info!(count = paths.len(), "loaded plugins");
        Ok(paths.len())
    }

    /// Load and register every discovered plugin, continuing past failures.
    ///
    /// Returns every error encountered; an empty list means all succeeded.
    pub fn load_safe(&self, registry: &Registry) -> Vec<Error> {
        let paths = match self.discover() {
            Ok(paths) => paths,
            Err(e) => return vec![e],
        };

        let mut errors = Vec::new();
        for path in &paths {
            if let Err(e) = self.load_one(registry, path) {
                warn!(path = %path.display(), error = %e, "skipping plugin");
                errors.push(e);
            }
        }
        info!(
            loaded = paths.len() - errors.len(),
            failed = errors.len(),
            "loaded plugins"
        );
        errors
    }

    fn load_one(&self, registry: &Registry, path: &Path) -> Result<()> {
        let plugin = self.factory.instantiate(path).map_err(|e| match e {
            Error::Load { .. } => e,
            other => Error::Load {
                path: path.display().to_string(),
                reason: other.to_string(),
            },
        })?;
        debug!(path = %path.display(), plugin = plugin.name(), "instantiated plugin");
        registry.register(plugin)
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.config.extension)
    }
}
