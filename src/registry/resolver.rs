//! Dependency resolution.
//!
//! Checks every declared dependency against what is registered without
//! changing any state.

use crate::core::{Error, Result};
use crate::registry::Registry;
use std::collections::HashMap;
use tracing::debug;

impl Registry {
    /// Confirm every plugin's dependencies are registered and version-compatible.
    ///
    /// Plugins are checked in registration order and the first problem is
    /// returned. A missing optional dependency is fine; a registered optional
    /// dependency must still satisfy its constraint.
    pub fn resolve_dependencies(&self) -> Result<()> {
        let plugins = self.all();
        let versions: HashMap<&str, &str> = plugins
            .iter()
            .map(|plugin| (plugin.name(), plugin.version()))
            .collect();

        for plugin in &plugins {
            for dep in plugin.dependencies() {
                let Some(found) = versions.get(dep.name.as_str()) else {
                    if dep.optional {
                        debug!(
                            plugin = plugin.name(),
                            dependency = %dep.name,
                            "optional dependency not registered"
                        );
                        continue;
                    }
                    return Err(Error::MissingDependency {
                        plugin: plugin.name().to_string(),
                        dependency: dep.name,
                    });
                };

                if !dep.is_satisfied_by(found) {
                    return Err(Error::VersionMismatch {
                        plugin: plugin.name().to_string(),
                        dependency: dep.name,
                        required: dep.version,
                        found: found.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
