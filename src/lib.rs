//! # plugboard - plugin registry and lifecycle manager
//!
//! Lets independently written plugins register typed capabilities with a
//! host, declare versioned dependencies on each other, and be brought up and
//! torn down in dependency order:
//! - **Version**: `major.minor.patch` versions and `^`/`~`/comparison constraints
//! - **Plugin**: the plugin contract and optional capability interfaces
//! - **Hooks**: named events fired around lifecycle and render steps
//! - **Registry**: registration, capability collection, dependency
//!   resolution, topological ordering and lifecycle orchestration
//! - **Loader**: directory discovery feeding an injected plugin factory
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use plugboard::plugin::{Dependency, Plugin, PluginContext, PluginResult};
//! use plugboard::registry::Registry;
//! use std::sync::Arc;
//!
//! struct Analytics;
//!
//! #[async_trait]
//! impl Plugin for Analytics {
//!     fn name(&self) -> &str { "analytics" }
//!     fn version(&self) -> &str { "1.2.0" }
//!     fn dependencies(&self) -> Vec<Dependency> {
//!         vec![Dependency::required("http", "^1.0.0")]
//!     }
//!     async fn init(&self, _ctx: &PluginContext, _registry: &Registry) -> PluginResult<()> {
//!         Ok(())
//!     }
//!     async fn shutdown(&self, _ctx: &PluginContext) -> PluginResult<()> {
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> plugboard::Result<()> {
//!     let registry = Registry::new();
//!     registry.register(Arc::new(Analytics))?;
//!
//!     let ctx = PluginContext::new();
//!     registry.initialize(&ctx).await?;
//!     registry.shutdown(&ctx).await
//! }
//! ```

pub mod core;
pub mod hooks;
pub mod loader;
pub mod plugin;
pub mod registry;
pub mod version;

pub use crate::core::error::{Error, Result};
pub use hooks::{HookContext, HookManager};
pub use plugin::{Dependency, Plugin, PluginContext, PluginError, PluginResult};
pub use registry::{PluginState, Registry};
pub use version::{satisfies, Version, VersionConstraint};
