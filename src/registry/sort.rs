//! Dependency ordering.
//!
//! Kahn's algorithm over the registered plugins. Among plugins that are ready
//! at the same time the one registered first goes first, so the order is
//! reproducible.

use crate::core::{Error, Result};
use crate::plugin::Plugin;
use crate::registry::Registry;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;
use tracing::debug;

impl Registry {
    /// Order plugins so every registered dependency precedes its dependents.
    ///
    /// Dependencies on plugins that are not registered are ignored here;
    /// [`Registry::resolve_dependencies`] reports them. Fails with
    /// [`Error::CircularDependency`] if the graph has a cycle.
    pub fn topological_sort(&self) -> Result<Vec<Arc<dyn Plugin>>> {
        let plugins = self.all();
        let index: HashMap<&str, usize> = plugins
            .iter()
            .enumerate()
            .map(|(i, plugin)| (plugin.name(), i))
            .collect();

        // Edges point from a dependency to its dependent.
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); plugins.len()];
        let mut in_degree = vec![0usize; plugins.len()];
        for (i, plugin) in plugins.iter().enumerate() {
            for dep in plugin.dependencies() {
                if let Some(&j) = index.get(dep.name.as_str()) {
                    dependents[j].push(i);
                    in_degree[i] += 1;
                }
            }
        }

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &degree)| degree == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(plugins.len());
        while let Some(Reverse(i)) = ready.pop() {
            order.push(i);
            for &next in &dependents[i] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }

        if order.len() < plugins.len() {
            let stuck: Vec<&str> = in_degree
                .iter()
                .enumerate()
                .filter(|(_, &degree)| degree > 0)
                .map(|(i, _)| plugins[i].name())
                .collect();
            debug!(plugins = ?stuck, "dependency cycle among unsorted plugins");
            return Err(Error::CircularDependency);
        }

        Ok(order.into_iter().map(|i| Arc::clone(&plugins[i])).collect())
    }
}
