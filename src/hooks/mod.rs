//! Hooks Module
//!
//! Named extension points fired around plugin lifecycle steps and by
//! rendering pipelines that share the registry's hook manager.

pub mod events;
pub mod manager;

pub use manager::{HookContext, HookHandler, HookManager};
