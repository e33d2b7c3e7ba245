//! Optional capability interfaces.
//!
//! A plugin opts into a capability by implementing the trait and returning
//! itself from the matching `Plugin::as_*_provider` method.

use crate::core::effective_priority;
use crate::plugin::assets::{
    AlpineComponent, AlpineDirective, AlpineMagic, AlpineStore, ComponentConstructor, CvaConfig,
    Font, Middleware, Script, Theme,
};
use crate::plugin::interface::Plugin;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Capabilities a plugin can provide besides the base contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Component,
    Asset,
    Theme,
    Middleware,
}

impl Capability {
    /// Every capability, in index order.
    pub const ALL: [Capability; 4] = [
        Capability::Component,
        Capability::Asset,
        Capability::Theme,
        Capability::Middleware,
    ];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Component => write!(f, "component"),
            Capability::Asset => write!(f, "asset"),
            Capability::Theme => write!(f, "theme"),
            Capability::Middleware => write!(f, "middleware"),
        }
    }
}

/// Provides UI component constructors.
pub trait ComponentProvider: Plugin {
    /// Component name -> constructor.
    fn components(&self) -> HashMap<String, ComponentConstructor>;

    /// Style-variant configurations keyed by component name.
    fn cva_extensions(&self) -> HashMap<String, CvaConfig> {
        HashMap::new()
    }
}

/// Provides scripts and Alpine.js extensions.
pub trait AssetProvider: Plugin {
    fn scripts(&self) -> Vec<Script> {
        Vec::new()
    }

    fn directives(&self) -> Vec<AlpineDirective> {
        Vec::new()
    }

    fn stores(&self) -> Vec<AlpineStore> {
        Vec::new()
    }

    fn magics(&self) -> Vec<AlpineMagic> {
        Vec::new()
    }

    fn alpine_components(&self) -> Vec<AlpineComponent> {
        Vec::new()
    }
}

/// Provides color themes, stylesheet text and fonts.
pub trait ThemeProvider: Plugin {
    /// Theme name -> theme.
    fn themes(&self) -> HashMap<String, Theme>;

    /// Name of the theme to use when none is selected.
    fn default_theme(&self) -> String {
        String::new()
    }

    /// Additional stylesheet text.
    fn css(&self) -> String {
        String::new()
    }

    fn fonts(&self) -> Vec<Font> {
        Vec::new()
    }
}

/// Provides an HTTP middleware layer.
pub trait MiddlewareProvider: Plugin {
    /// The middleware function.
    fn middleware(&self) -> Middleware;

    /// Ordering priority; lower runs earlier, zero means the default of 50.
    fn priority(&self) -> i32 {
        0
    }

    /// Priority used for ordering.
    fn effective_priority(&self) -> i32 {
        effective_priority(self.priority())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_serialization() {
        let json = serde_json::to_string(&Capability::Middleware).unwrap();
        assert_eq!(json, "\"middleware\"");

        let parsed: Capability = serde_json::from_str("\"asset\"").unwrap();
        assert_eq!(parsed, Capability::Asset);
    }

    #[test]
    fn test_capability_display_matches_serde() {
        for cap in Capability::ALL {
            let json = serde_json::to_string(&cap).unwrap();
            assert_eq!(json.trim_matches('"'), cap.to_string());
        }
    }
}
