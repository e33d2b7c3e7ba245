//! Plugin Module
//!
//! Defines what a plugin is:
//! - Base plugin contract and dependency declarations
//! - Optional capability interfaces
//! - Payload types collected from capability providers

pub mod assets;
pub mod capability;
pub mod interface;

pub use assets::{
    AlpineComponent, AlpineDirective, AlpineMagic, AlpineStore, ComponentConstructor, CvaConfig,
    Font, Handler, Middleware, Script, Theme,
};
pub use capability::{
    AssetProvider, Capability, ComponentProvider, MiddlewareProvider, ThemeProvider,
};
pub use interface::{Dependency, Plugin, PluginContext, PluginError, PluginResult};
