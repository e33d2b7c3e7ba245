//! Registry Module
//!
//! The central plugin store and everything that operates on it:
//! - Registration and capability indexes
//! - Dependency resolution
//! - Topological ordering
//! - Lifecycle orchestration

pub mod lifecycle;
#[allow(clippy::module_inception)]
pub mod registry;
pub mod resolver;
pub mod sort;

#[cfg(test)]
pub(crate) mod testing;

pub use lifecycle::{LifecycleEvent, LifecycleTracker, PluginState};
pub use registry::{MiddlewareEntry, Registry};
