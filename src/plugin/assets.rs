//! Payload types returned by capability providers.
//!
//! The registry orders and aggregates these values but never interprets
//! their content.

use crate::core::effective_priority;
use http::{Request, Response};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a UI component's markup from its props.
pub type ComponentConstructor = Arc<dyn Fn(&serde_json::Value) -> String + Send + Sync>;

/// An HTTP handler.
pub type Handler = Arc<dyn Fn(&Request<String>) -> Response<String> + Send + Sync>;

/// Wraps a handler with additional behavior.
pub type Middleware = Arc<dyn Fn(Handler) -> Handler + Send + Sync>;

/// Class-variance configuration for a component's style variants.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CvaConfig {
    /// Classes always applied
    pub base: String,
    /// Variant name -> option -> classes
    pub variants: HashMap<String, HashMap<String, String>>,
    /// Variant name -> option selected when none is given
    pub default_variants: HashMap<String, String>,
}

/// A script tag contributed by an asset provider.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Script {
    /// External source URL
    pub src: Option<String>,
    /// Inline content
    pub content: Option<String>,
    /// Load with `defer`
    pub defer: bool,
    /// Load with `async`
    pub r#async: bool,
    /// Load as an ES module
    pub module: bool,
    /// Load order; lower loads earlier, zero means the default of 50
    pub priority: i32,
}

impl Script {
    /// Script loaded from a URL.
    pub fn src(url: &str) -> Self {
        Self {
            src: Some(url.to_string()),
            ..Default::default()
        }
    }

    /// Script with inline content.
    pub fn inline(content: &str) -> Self {
        Self {
            content: Some(content.to_string()),
            ..Default::default()
        }
    }

    /// Set load priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Mark as deferred.
    pub fn deferred(mut self) -> Self {
        self.defer = true;
        self
    }

    /// Priority used for ordering.
    pub fn effective_priority(&self) -> i32 {
        effective_priority(self.priority)
    }
}

/// A custom Alpine.js directive (`x-<name>`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlpineDirective {
    /// Directive name without the `x-` prefix
    pub name: String,
    /// JavaScript handler source
    pub handler: String,
}

/// A global Alpine.js store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlpineStore {
    /// Store name
    pub name: String,
    /// Initial state
    pub state: serde_json::Value,
    /// Optional JavaScript methods source
    #[serde(default)]
    pub methods: Option<String>,
}

/// A custom Alpine.js magic property (`$<name>`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlpineMagic {
    /// Magic name without the `$` prefix
    pub name: String,
    /// JavaScript handler source
    pub handler: String,
}

/// A reusable Alpine.js data component.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlpineComponent {
    /// Component name used with `x-data`
    pub name: String,
    /// JavaScript definition source
    pub definition: String,
}

/// A web font.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Font {
    /// Font family
    pub family: String,
    /// Source URL
    pub src: String,
    /// Weight, e.g. `400` or `100 900`
    #[serde(default)]
    pub weight: Option<String>,
    /// Style, e.g. `normal` or `italic`
    #[serde(default)]
    pub style: Option<String>,
    /// `font-display` value
    #[serde(default)]
    pub display: Option<String>,
}

/// A named color theme.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Theme name
    pub name: String,
    /// CSS custom properties for light mode
    #[serde(default)]
    pub light: HashMap<String, String>,
    /// CSS custom properties for dark mode
    #[serde(default)]
    pub dark: HashMap<String, String>,
}
