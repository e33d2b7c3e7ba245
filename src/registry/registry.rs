//! Plugin registry.
//!
//! Stores registered plugins, files them into capability indexes and
//! aggregates what capability providers contribute.

use crate::core::{now, Error, RegistryConfig, Result, Timestamp};
use crate::hooks::HookManager;
use crate::plugin::{
    AlpineComponent, AlpineDirective, AlpineMagic, AlpineStore, AssetProvider, Capability,
    ComponentConstructor, ComponentProvider, CvaConfig, Font, Handler, Middleware,
    MiddlewareProvider, Plugin, Script, Theme, ThemeProvider,
};
use crate::registry::lifecycle::LifecycleTracker;
use crate::version::Version;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Registered plugin entry.
pub(crate) struct RegisteredPlugin {
    /// Plugin instance
    pub plugin: Arc<dyn Plugin>,
    /// Capabilities detected at registration
    pub capabilities: Vec<Capability>,
    /// Registration time
    pub registered_at: Timestamp,
}

/// One layer of the middleware chain.
#[derive(Clone)]
pub struct MiddlewareEntry {
    /// Providing plugin
    pub plugin: String,
    /// Effective priority (unset priorities are already mapped to 50)
    pub priority: i32,
    provider: Arc<dyn MiddlewareProvider>,
}

impl MiddlewareEntry {
    /// The provider's middleware function.
    pub fn middleware(&self) -> Middleware {
        self.provider.middleware()
    }

    /// The providing plugin.
    pub fn provider(&self) -> &Arc<dyn MiddlewareProvider> {
        &self.provider
    }
}

impl fmt::Debug for MiddlewareEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareEntry")
            .field("plugin", &self.plugin)
            .field("priority", &self.priority)
            .finish()
    }
}

/// State guarded by the registry lock.
///
/// Every capability index holds a subset of `plugins`. All maps iterate in
/// registration order.
#[derive(Default)]
pub(crate) struct Inner {
    pub plugins: IndexMap<String, RegisteredPlugin>,
    pub components: IndexMap<String, Arc<dyn ComponentProvider>>,
    pub assets: IndexMap<String, Arc<dyn AssetProvider>>,
    pub themes: IndexMap<String, Arc<dyn ThemeProvider>>,
    /// Sorted ascending by priority, ties in registration order
    pub middleware: Vec<MiddlewareEntry>,
    /// Plugins in the order the last successful `initialize` brought them up
    pub init_order: Vec<Arc<dyn Plugin>>,
    pub lifecycle: LifecycleTracker,
}

/// Capability handles obtained from a plugin before the lock is taken.
struct Detected {
    component: Option<Arc<dyn ComponentProvider>>,
    asset: Option<Arc<dyn AssetProvider>>,
    theme: Option<Arc<dyn ThemeProvider>>,
    middleware: Option<Arc<dyn MiddlewareProvider>>,
}

impl Detected {
    fn detect(plugin: &Arc<dyn Plugin>) -> Self {
        Self {
            component: Arc::clone(plugin).as_component_provider(),
            asset: Arc::clone(plugin).as_asset_provider(),
            theme: Arc::clone(plugin).as_theme_provider(),
            middleware: Arc::clone(plugin).as_middleware_provider(),
        }
    }

    fn capabilities(&self) -> Vec<Capability> {
        let flags = [
            self.component.is_some(),
            self.asset.is_some(),
            self.theme.is_some(),
            self.middleware.is_some(),
        ];
        Capability::ALL
            .into_iter()
            .zip(flags)
            .filter_map(|(cap, present)| present.then_some(cap))
            .collect()
    }
}

/// Central store of registered plugins.
///
/// Created explicitly and passed around by the host; there is no global
/// instance. All methods take `&self`: one reader/writer lock guards plugin
/// state and the embedded [`HookManager`] has its own.
pub struct Registry {
    pub(crate) inner: RwLock<Inner>,
    pub(crate) hooks: HookManager,
    pub(crate) config: RegistryConfig,
}

impl Registry {
    /// Create an empty registry with default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            hooks: HookManager::new(),
            config,
        }
    }

    /// Registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The hook manager shared by lifecycle and render events.
    pub fn hooks(&self) -> &HookManager {
        &self.hooks
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a plugin.
    ///
    /// Fails on a blank or already registered name, leaving the registry
    /// unchanged.
    pub fn register(&self, plugin: Arc<dyn Plugin>) -> Result<()> {
        let name = plugin.name().to_string();
        if name.trim().is_empty() {
            return Err(Error::EmptyName);
        }
        if Version::parse(plugin.version()).is_err() {
            warn!(
                plugin = %name,
                version = plugin.version(),
                "plugin version is not major.minor.patch; constraints on it will never match"
            );
        }

        let detected = Detected::detect(&plugin);
        let capabilities = detected.capabilities();

        let mut inner = self.write();
        if inner.plugins.contains_key(&name) {
            return Err(Error::DuplicatePlugin(name));
        }

        if let Some(provider) = detected.component {
            inner.components.insert(name.clone(), provider);
        }
        if let Some(provider) = detected.asset {
            inner.assets.insert(name.clone(), provider);
        }
        if let Some(provider) = detected.theme {
            inner.themes.insert(name.clone(), provider);
        }
        if let Some(provider) = detected.middleware {
            inner.middleware.push(MiddlewareEntry {
                plugin: name.clone(),
                priority: provider.effective_priority(),
                provider,
            });
            // Stable: equal priorities keep registration order.
            inner.middleware.sort_by_key(|entry| entry.priority);
        }

        info!(
            plugin = %name,
            version = plugin.version(),
            capabilities = ?capabilities,
            "plugin registered"
        );
        inner.plugins.insert(
            name,
            RegisteredPlugin {
                plugin,
                capabilities,
                registered_at: now(),
            },
        );
        Ok(())
    }

    /// Register several plugins, skipping any that fail.
    ///
    /// Failures are logged; call [`Registry::register`] directly to handle them.
    pub fn use_plugins<I>(&self, plugins: I) -> &Self
    where
        I: IntoIterator<Item = Arc<dyn Plugin>>,
    {
        for plugin in plugins {
            let name = plugin.name().to_string();
            if let Err(e) = self.register(plugin) {
                warn!(plugin = %name, error = %e, "skipping plugin");
            }
        }
        self
    }

    /// Remove a plugin and every index entry that refers to it.
    ///
    /// A plugin recorded by a successful `initialize` is still shut down by
    /// the next `shutdown`.
    pub fn unregister(&self, name: &str) -> Result<()> {
        let mut inner = self.write();
        if inner.plugins.shift_remove(name).is_none() {
            return Err(Error::PluginNotFound(name.to_string()));
        }
        inner.components.shift_remove(name);
        inner.assets.shift_remove(name);
        inner.themes.shift_remove(name);
        inner.middleware.retain(|entry| entry.plugin != name);
        inner.lifecycle.forget(name);

        info!(plugin = %name, "plugin unregistered");
        Ok(())
    }

    /// Get a plugin by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.read().plugins.get(name).map(|e| Arc::clone(&e.plugin))
    }

    /// Whether a plugin is registered.
    pub fn has(&self, name: &str) -> bool {
        self.read().plugins.contains_key(name)
    }

    /// Number of registered plugins.
    pub fn count(&self) -> usize {
        self.read().plugins.len()
    }

    /// All plugins, in registration order.
    pub fn all(&self) -> Vec<Arc<dyn Plugin>> {
        self.read()
            .plugins
            .values()
            .map(|e| Arc::clone(&e.plugin))
            .collect()
    }

    /// Names of all plugins, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.read().plugins.keys().cloned().collect()
    }

    /// When a plugin was registered.
    pub fn registered_at(&self, name: &str) -> Option<Timestamp> {
        self.read().plugins.get(name).map(|e| e.registered_at)
    }

    /// Capabilities detected for a plugin.
    pub fn capabilities_of(&self, name: &str) -> Option<Vec<Capability>> {
        self.read().plugins.get(name).map(|e| e.capabilities.clone())
    }

    /// Names of plugins providing a capability, in registration order.
    pub fn list_by_capability(&self, capability: Capability) -> Vec<String> {
        self.read()
            .plugins
            .iter()
            .filter(|(_, e)| e.capabilities.contains(&capability))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Look up a plugin that provides components.
    pub fn get_component_plugin(&self, name: &str) -> Option<Arc<dyn ComponentProvider>> {
        self.read().components.get(name).cloned()
    }

    /// Look up a plugin that provides scripts and Alpine.js extensions.
    pub fn get_alpine_plugin(&self, name: &str) -> Option<Arc<dyn AssetProvider>> {
        self.read().assets.get(name).cloned()
    }

    /// Look up a plugin that provides themes.
    pub fn get_theme_plugin(&self, name: &str) -> Option<Arc<dyn ThemeProvider>> {
        self.read().themes.get(name).cloned()
    }

    /// Look up a plugin that provides middleware.
    pub fn get_middleware_plugin(&self, name: &str) -> Option<Arc<dyn MiddlewareProvider>> {
        self.read()
            .middleware
            .iter()
            .find(|entry| entry.plugin == name)
            .map(|entry| Arc::clone(&entry.provider))
    }

    // Collection calls snapshot the providers and release the lock before
    // calling into plugin code.

    fn component_providers(&self) -> Vec<Arc<dyn ComponentProvider>> {
        self.read().components.values().cloned().collect()
    }

    fn asset_providers(&self) -> Vec<Arc<dyn AssetProvider>> {
        self.read().assets.values().cloned().collect()
    }

    fn theme_providers(&self) -> Vec<Arc<dyn ThemeProvider>> {
        self.read().themes.values().cloned().collect()
    }

    /// Merge every provider's component constructors.
    ///
    /// On a name clash the plugin registered later wins.
    pub fn collect_components(&self) -> HashMap<String, ComponentConstructor> {
        let mut merged = HashMap::new();
        for provider in self.component_providers() {
            for (component, constructor) in provider.components() {
                if merged.insert(component.clone(), constructor).is_some() {
                    debug!(
                        component = %component,
                        plugin = provider.name(),
                        "component overridden by later plugin"
                    );
                }
            }
        }
        merged
    }

    /// Merge every provider's style-variant configurations; later plugins win.
    pub fn collect_cva_extensions(&self) -> HashMap<String, CvaConfig> {
        let mut merged = HashMap::new();
        for provider in self.component_providers() {
            merged.extend(provider.cva_extensions());
        }
        merged
    }

    /// All scripts, ascending by priority.
    ///
    /// Equal priorities keep registration order, then the order each plugin
    /// listed them in.
    pub fn collect_scripts(&self) -> Vec<Script> {
        let mut scripts: Vec<Script> = self
            .asset_providers()
            .iter()
            .flat_map(|provider| provider.scripts())
            .collect();
        scripts.sort_by_key(Script::effective_priority);
        scripts
    }

    /// Alpine directives from every asset provider, in registration order.
    pub fn collect_directives(&self) -> Vec<AlpineDirective> {
        self.asset_providers()
            .iter()
            .flat_map(|provider| provider.directives())
            .collect()
    }

    /// Alpine stores from every asset provider, in registration order.
    pub fn collect_stores(&self) -> Vec<AlpineStore> {
        self.asset_providers()
            .iter()
            .flat_map(|provider| provider.stores())
            .collect()
    }

    /// Alpine magics from every asset provider, in registration order.
    pub fn collect_magics(&self) -> Vec<AlpineMagic> {
        self.asset_providers()
            .iter()
            .flat_map(|provider| provider.magics())
            .collect()
    }

    /// Alpine components from every asset provider, in registration order.
    pub fn collect_alpine_components(&self) -> Vec<AlpineComponent> {
        self.asset_providers()
            .iter()
            .flat_map(|provider| provider.alpine_components())
            .collect()
    }

    /// Merge every provider's themes; later plugins win on a name clash.
    pub fn collect_themes(&self) -> HashMap<String, Theme> {
        let mut merged = HashMap::new();
        for provider in self.theme_providers() {
            merged.extend(provider.themes());
        }
        merged
    }

    /// Concatenate theme stylesheets in registration order.
    pub fn collect_css(&self) -> String {
        self.theme_providers()
            .iter()
            .map(|provider| provider.css())
            .filter(|css| !css.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Fonts from every theme provider, in registration order.
    pub fn collect_fonts(&self) -> Vec<Font> {
        self.theme_providers()
            .iter()
            .flat_map(|provider| provider.fonts())
            .collect()
    }

    /// Copy of the middleware chain, ascending by priority.
    pub fn collect_middleware(&self) -> Vec<MiddlewareEntry> {
        self.read().middleware.clone()
    }

    /// Wrap `handler` in every registered middleware.
    ///
    /// The lowest priority ends up outermost, so it sees requests first.
    pub fn apply_middleware(&self, handler: Handler) -> Handler {
        self.collect_middleware()
            .iter()
            .rev()
            .fold(handler, |next, entry| (entry.middleware())(next))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("plugins", &self.names())
            .field("hooks", &self.hooks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::testing::{
        AssetPlugin, ComponentPlugin, MiddlewarePlugin, TestPlugin, ThemePlugin,
    };
    use http::{Request, Response};
    use std::sync::Mutex;

    #[test]
    fn test_registry_creation() {
        let registry = Registry::new();
        assert_eq!(registry.count(), 0);
        assert!(registry.all().is_empty());
    }

    #[test]
    fn test_register_plugin() {
        let registry = Registry::new();
        registry.register(TestPlugin::new("echo").arc()).unwrap();

        assert_eq!(registry.count(), 1);
        assert!(registry.has("echo"));
        assert_eq!(registry.get("echo").unwrap().version(), "1.0.0");
        assert!(registry.registered_at("echo").is_some());
        assert_eq!(registry.capabilities_of("echo"), Some(vec![]));
    }

    #[test]
    fn test_empty_name_rejected() {
        let registry = Registry::new();
        registry.register(TestPlugin::new("a").arc()).unwrap();

        for blank in ["", "   "] {
            let err = registry.register(TestPlugin::new(blank).arc()).unwrap_err();
            assert!(matches!(err, Error::EmptyName));
        }
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_duplicate_registration() {
        let registry = Registry::new();
        registry.register(TestPlugin::new("echo").arc()).unwrap();

        let err = registry
            .register(TestPlugin::new("echo").with_version("2.0.0").arc())
            .unwrap_err();
        assert!(matches!(err, Error::DuplicatePlugin(ref name) if name == "echo"));
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.get("echo").unwrap().version(), "1.0.0");
    }

    #[test]
    fn test_duplicate_provider_leaves_indexes_untouched() {
        let registry = Registry::new();
        registry
            .register(MiddlewarePlugin::new("auth", 10).arc())
            .unwrap();
        assert!(registry
            .register(MiddlewarePlugin::new("auth", 1).arc())
            .is_err());

        let chain = registry.collect_middleware();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].priority, 10);
    }

    #[test]
    fn test_all_in_registration_order() {
        let registry = Registry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry.register(TestPlugin::new(name).arc()).unwrap();
        }
        assert_eq!(registry.names(), vec!["zeta", "alpha", "mid"]);
        let all: Vec<String> = registry.all().iter().map(|p| p.name().to_string()).collect();
        assert_eq!(all, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_use_plugins_swallows_errors() {
        let registry = Registry::new();
        registry
            .use_plugins(vec![
                TestPlugin::new("a").arc(),
                TestPlugin::new("").arc(),
                TestPlugin::new("a").arc(),
            ])
            .use_plugins(vec![TestPlugin::new("b").arc()]);

        assert_eq!(registry.names(), vec!["a", "b"]);
    }

    #[test]
    fn test_unregister_prunes_indexes() {
        let registry = Registry::new();
        registry
            .register(ComponentPlugin::new("ui", &["button"]).arc())
            .unwrap();
        registry
            .register(MiddlewarePlugin::new("gzip", 5).arc())
            .unwrap();

        registry.unregister("ui").unwrap();
        registry.unregister("gzip").unwrap();

        assert_eq!(registry.count(), 0);
        assert!(registry.get_component_plugin("ui").is_none());
        assert!(registry.collect_components().is_empty());
        assert!(registry.collect_middleware().is_empty());
        assert!(matches!(
            registry.unregister("ui"),
            Err(Error::PluginNotFound(_))
        ));
    }

    #[test]
    fn test_capability_detection() {
        let registry = Registry::new();
        registry.register(TestPlugin::new("plain").arc()).unwrap();
        registry
            .register(ComponentPlugin::new("ui", &["card"]).arc())
            .unwrap();
        registry.register(AssetPlugin::new("alpine").arc()).unwrap();
        registry.register(ThemePlugin::new("slate").arc()).unwrap();
        registry
            .register(MiddlewarePlugin::new("cors", 0).arc())
            .unwrap();

        assert!(registry.get_component_plugin("ui").is_some());
        assert!(registry.get_component_plugin("plain").is_none());
        assert!(registry.get_alpine_plugin("alpine").is_some());
        assert!(registry.get_theme_plugin("slate").is_some());
        assert!(registry.get_middleware_plugin("cors").is_some());
        assert_eq!(
            registry.capabilities_of("slate"),
            Some(vec![Capability::Theme])
        );
        assert_eq!(registry.list_by_capability(Capability::Asset), vec!["alpine"]);
        assert_eq!(registry.capabilities_of("missing"), None);
    }

    #[test]
    fn test_collect_components_later_wins() {
        let registry = Registry::new();
        registry
            .register(ComponentPlugin::new("base-ui", &["button", "card"]).arc())
            .unwrap();
        registry
            .register(ComponentPlugin::new("brand-ui", &["button"]).arc())
            .unwrap();

        let components = registry.collect_components();
        assert_eq!(components.len(), 2);
        let button = &components["button"];
        assert_eq!(button(&serde_json::json!({})), "brand-ui:button");
        assert_eq!(components["card"](&serde_json::json!({})), "base-ui:card");

        let cva = registry.collect_cva_extensions();
        assert_eq!(cva["button"].base, "brand-ui");
    }

    #[test]
    fn test_collect_scripts_sorted_by_priority() {
        let registry = Registry::new();
        registry
            .register(
                AssetPlugin::new("first")
                    .with_scripts(vec![
                        Script::src("/default-a.js"),
                        Script::src("/late.js").with_priority(90),
                    ])
                    .arc(),
            )
            .unwrap();
        registry
            .register(
                AssetPlugin::new("second")
                    .with_scripts(vec![
                        Script::src("/early.js").with_priority(10),
                        Script::src("/default-b.js").with_priority(50),
                    ])
                    .arc(),
            )
            .unwrap();

        let srcs: Vec<String> = registry
            .collect_scripts()
            .into_iter()
            .filter_map(|s| s.src)
            .collect();
        assert_eq!(
            srcs,
            vec!["/early.js", "/default-a.js", "/default-b.js", "/late.js"]
        );
    }

    #[test]
    fn test_collect_alpine_payloads_concatenate() {
        let registry = Registry::new();
        registry.register(AssetPlugin::new("one").arc()).unwrap();
        registry.register(AssetPlugin::new("two").arc()).unwrap();

        let directives: Vec<String> = registry
            .collect_directives()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(directives, vec!["one-directive", "two-directive"]);
        assert_eq!(registry.collect_stores().len(), 2);
        assert_eq!(registry.collect_magics().len(), 2);
        assert_eq!(registry.collect_alpine_components()[1].name, "two-component");
    }

    #[test]
    fn test_collect_theme_assets() {
        let registry = Registry::new();
        registry.register(ThemePlugin::new("slate").arc()).unwrap();
        registry.register(ThemePlugin::new("rose").arc()).unwrap();

        let themes = registry.collect_themes();
        assert!(themes.contains_key("slate"));
        assert!(themes.contains_key("rose"));
        assert_eq!(registry.collect_css(), ".slate {}\n.rose {}");
        assert_eq!(registry.collect_fonts().len(), 2);
        assert_eq!(
            registry.get_theme_plugin("rose").unwrap().default_theme(),
            "rose"
        );
    }

    #[test]
    fn test_collect_middleware_sorted_by_priority() {
        let registry = Registry::new();
        registry
            .register(MiddlewarePlugin::new("default", 0).arc())
            .unwrap();
        registry
            .register(MiddlewarePlugin::new("late", 80).arc())
            .unwrap();
        registry
            .register(MiddlewarePlugin::new("early", 5).arc())
            .unwrap();
        registry
            .register(MiddlewarePlugin::new("also-default", 50).arc())
            .unwrap();

        let chain = registry.collect_middleware();
        let order: Vec<(&str, i32)> = chain
            .iter()
            .map(|e| (e.plugin.as_str(), e.priority))
            .collect();
        assert_eq!(
            order,
            vec![("early", 5), ("default", 50), ("also-default", 50), ("late", 80)]
        );
    }

    #[test]
    fn test_collect_middleware_is_a_copy() {
        let registry = Registry::new();
        registry
            .register(MiddlewarePlugin::new("cors", 1).arc())
            .unwrap();

        let mut chain = registry.collect_middleware();
        chain.clear();
        assert_eq!(registry.collect_middleware().len(), 1);
    }

    #[test]
    fn test_apply_middleware_lowest_priority_runs_first() {
        let registry = Registry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        registry
            .register(MiddlewarePlugin::new("logging", 90).with_log(&log).arc())
            .unwrap();
        registry
            .register(MiddlewarePlugin::new("auth", 10).with_log(&log).arc())
            .unwrap();

        let handler: Handler = Arc::new(|_req: &Request<String>| Response::new("ok".to_string()));
        let wrapped = registry.apply_middleware(handler);

        let response = wrapped(&Request::new(String::new()));
        assert_eq!(response.body(), "ok");
        assert_eq!(*log.lock().unwrap(), vec!["auth", "logging"]);
    }

    #[test]
    fn test_concurrent_register() {
        let registry = Arc::new(Registry::new());
        let threads: Vec<_> = (0..8)
            .map(|t| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    let mut ok = 0;
                    for i in 0..50 {
                        // Every name is attempted by two threads.
                        let name = format!("plugin-{}", (t % 4) * 50 + i);
                        if registry.register(TestPlugin::new(&name).arc()).is_ok() {
                            ok += 1;
                        }
                    }
                    ok
                })
            })
            .collect();

        let successes: usize = threads.into_iter().map(|t| t.join().unwrap()).sum();
        assert_eq!(successes, 200);
        assert_eq!(registry.count(), 200);
        assert_eq!(registry.all().len(), 200);
        for n in 0..200 {
            assert!(registry.get(&format!("plugin-{}", n)).is_some());
        }
    }
}
