//! Plugins used by the registry tests.

use crate::plugin::{
    AlpineComponent, AlpineDirective, AlpineMagic, AlpineStore, AssetProvider, ComponentConstructor,
    ComponentProvider, CvaConfig, Dependency, Font, Handler, Middleware, MiddlewareProvider, Plugin,
    PluginContext, PluginError, PluginResult, Script, Theme, ThemeProvider,
};
use crate::registry::Registry;
use async_trait::async_trait;
use http::Request;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Plugin that records lifecycle calls and can be told to fail.
pub struct TestPlugin {
    name: String,
    version: String,
    deps: Vec<Dependency>,
    log: Option<CallLog>,
    fail_init: bool,
    fail_shutdown: bool,
    pub init_calls: AtomicUsize,
    pub shutdown_calls: AtomicUsize,
}

impl TestPlugin {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            deps: Vec::new(),
            log: None,
            fail_init: false,
            fail_shutdown: false,
            init_calls: AtomicUsize::new(0),
            shutdown_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn depends_on(mut self, name: &str, constraint: &str) -> Self {
        self.deps.push(Dependency::required(name, constraint));
        self
    }

    pub fn optionally_depends_on(mut self, name: &str, constraint: &str) -> Self {
        self.deps.push(Dependency::optional(name, constraint));
        self
    }

    pub fn with_log(mut self, log: &CallLog) -> Self {
        self.log = Some(Arc::clone(log));
        self
    }

    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn failing_shutdown(mut self) -> Self {
        self.fail_shutdown = true;
        self
    }

    pub fn arc(self) -> Arc<dyn Plugin> {
        Arc::new(self)
    }

    fn record(&self, step: &str) {
        if let Some(log) = &self.log {
            log.lock().unwrap().push(format!("{}:{}", step, self.name));
        }
    }
}

#[async_trait]
impl Plugin for TestPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn dependencies(&self) -> Vec<Dependency> {
        self.deps.clone()
    }

    async fn init(&self, _ctx: &PluginContext, _registry: &Registry) -> PluginResult<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        self.record("init");
        if self.fail_init {
            return Err(PluginError::new(&format!("{} refused to start", self.name)));
        }
        Ok(())
    }

    async fn shutdown(&self, _ctx: &PluginContext) -> PluginResult<()> {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
        self.record("shutdown");
        if self.fail_shutdown {
            return Err(PluginError::new(&format!("{} refused to stop", self.name)));
        }
        Ok(())
    }
}

/// Declares the base plugin contract for a provider with no lifecycle work.
macro_rules! passive_plugin {
    ($ty:ty, $cast:ident, $provider:ident) => {
        #[async_trait]
        impl Plugin for $ty {
            fn name(&self) -> &str {
                &self.name
            }

            fn version(&self) -> &str {
                "1.0.0"
            }

            async fn init(&self, _ctx: &PluginContext, _registry: &Registry) -> PluginResult<()> {
                Ok(())
            }

            async fn shutdown(&self, _ctx: &PluginContext) -> PluginResult<()> {
                Ok(())
            }

            fn $cast(self: Arc<Self>) -> Option<Arc<dyn $provider>> {
                Some(self)
            }
        }
    };
}

/// Provides one constructor per listed component, rendering `plugin:component`.
pub struct ComponentPlugin {
    name: String,
    components: Vec<String>,
}

impl ComponentPlugin {
    pub fn new(name: &str, components: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            components: components.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn arc(self) -> Arc<dyn Plugin> {
        Arc::new(self)
    }
}

passive_plugin!(ComponentPlugin, as_component_provider, ComponentProvider);

impl ComponentProvider for ComponentPlugin {
    fn components(&self) -> HashMap<String, ComponentConstructor> {
        self.components
            .iter()
            .map(|component| {
                let rendered = format!("{}:{}", self.name, component);
                let constructor: ComponentConstructor =
                    Arc::new(move |_props: &serde_json::Value| rendered.clone());
                (component.clone(), constructor)
            })
            .collect()
    }

    fn cva_extensions(&self) -> HashMap<String, CvaConfig> {
        self.components
            .iter()
            .map(|component| {
                let config = CvaConfig {
                    base: self.name.clone(),
                    ..Default::default()
                };
                (component.clone(), config)
            })
            .collect()
    }
}

/// Provides one of each Alpine payload named after the plugin, plus scripts.
pub struct AssetPlugin {
    name: String,
    scripts: Vec<Script>,
}

impl AssetPlugin {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            scripts: Vec::new(),
        }
    }

    pub fn with_scripts(mut self, scripts: Vec<Script>) -> Self {
        self.scripts = scripts;
        self
    }

    pub fn arc(self) -> Arc<dyn Plugin> {
        Arc::new(self)
    }
}

passive_plugin!(AssetPlugin, as_asset_provider, AssetProvider);

impl AssetProvider for AssetPlugin {
    fn scripts(&self) -> Vec<Script> {
        self.scripts.clone()
    }

    fn directives(&self) -> Vec<AlpineDirective> {
        vec![AlpineDirective {
            name: format!("{}-directive", self.name),
            handler: "(el) => {}".to_string(),
        }]
    }

    fn stores(&self) -> Vec<AlpineStore> {
        vec![AlpineStore {
            name: format!("{}-store", self.name),
            state: serde_json::json!({ "open": false }),
            methods: None,
        }]
    }

    fn magics(&self) -> Vec<AlpineMagic> {
        vec![AlpineMagic {
            name: format!("{}-magic", self.name),
            handler: "() => null".to_string(),
        }]
    }

    fn alpine_components(&self) -> Vec<AlpineComponent> {
        vec![AlpineComponent {
            name: format!("{}-component", self.name),
            definition: "() => ({})".to_string(),
        }]
    }
}

/// Provides a theme, stylesheet and font named after the plugin.
pub struct ThemePlugin {
    name: String,
}

impl ThemePlugin {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    pub fn arc(self) -> Arc<dyn Plugin> {
        Arc::new(self)
    }
}

passive_plugin!(ThemePlugin, as_theme_provider, ThemeProvider);

impl ThemeProvider for ThemePlugin {
    fn themes(&self) -> HashMap<String, Theme> {
        let theme = Theme {
            name: self.name.clone(),
            ..Default::default()
        };
        HashMap::from([(self.name.clone(), theme)])
    }

    fn default_theme(&self) -> String {
        self.name.clone()
    }

    fn css(&self) -> String {
        format!(".{} {{}}", self.name)
    }

    fn fonts(&self) -> Vec<Font> {
        vec![Font {
            family: self.name.clone(),
            src: format!("/fonts/{}.woff2", self.name),
            weight: None,
            style: None,
            display: Some("swap".to_string()),
        }]
    }
}

/// Middleware that records its name before passing the request on.
pub struct MiddlewarePlugin {
    name: String,
    priority: i32,
    log: Option<CallLog>,
}

impl MiddlewarePlugin {
    pub fn new(name: &str, priority: i32) -> Self {
        Self {
            name: name.to_string(),
            priority,
            log: None,
        }
    }

    pub fn with_log(mut self, log: &CallLog) -> Self {
        self.log = Some(Arc::clone(log));
        self
    }

    pub fn arc(self) -> Arc<dyn Plugin> {
        Arc::new(self)
    }
}

passive_plugin!(MiddlewarePlugin, as_middleware_provider, MiddlewareProvider);

impl MiddlewareProvider for MiddlewarePlugin {
    fn middleware(&self) -> Middleware {
        let name = self.name.clone();
        let log = self.log.clone();
        Arc::new(move |next: Handler| -> Handler {
            let name = name.clone();
            let log = log.clone();
            Arc::new(move |req: &Request<String>| {
                if let Some(log) = &log {
                    log.lock().unwrap().push(name.clone());
                }
                next(req)
            })
        })
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}
