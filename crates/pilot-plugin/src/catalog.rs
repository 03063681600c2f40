//! Plugin catalog: named plugins kept in broadcast order.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use pilot_core::AppResult;
use pilot_core::events::{EventEmitter, Listener};

use crate::events::{CatalogEvent, REGISTER, UNREGISTER};
use crate::plugin::SharedPlugin;

/// A plugin given either by name or by handle.
#[derive(Debug, Clone)]
pub enum PluginRef {
    /// Plugin name.
    Name(String),
    /// Plugin handle; resolved through its name.
    Plugin(SharedPlugin),
}

impl PluginRef {
    /// The name this reference resolves through.
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Plugin(plugin) => plugin.name(),
        }
    }
}

impl From<&str> for PluginRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for PluginRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<SharedPlugin> for PluginRef {
    fn from(plugin: SharedPlugin) -> Self {
        Self::Plugin(plugin)
    }
}

impl From<&SharedPlugin> for PluginRef {
    fn from(plugin: &SharedPlugin) -> Self {
        Self::Plugin(plugin.clone())
    }
}

/// Membership state. Both collections hold the same plugins.
#[derive(Default)]
struct CatalogState {
    /// Plugin name → plugin.
    plugins: HashMap<String, SharedPlugin>,
    /// Plugins in registration (broadcast) order.
    registry: Vec<SharedPlugin>,
}

/// Registry of named plugins that can be signalled as a group.
///
/// No lock is held while plugin handlers or listeners run, so both may call
/// back into the catalog.
pub struct PluginCatalog {
    /// Membership.
    state: RwLock<CatalogState>,
    /// Catalog listeners.
    pub(crate) events: EventEmitter<CatalogEvent>,
}

impl PluginCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CatalogState::default()),
            events: EventEmitter::new(),
        }
    }

    /// Creates a catalog seeded with `plugins`.
    pub fn with_plugins<I>(plugins: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = SharedPlugin>,
    {
        let catalog = Self::new();
        catalog.register(plugins)?;
        Ok(catalog)
    }

    /// Adds each plugin whose name is not yet known and emits `register` for
    /// it. Plugins with a known name are skipped; the first registration wins.
    pub fn register<I>(&self, plugins: I) -> AppResult<&Self>
    where
        I: IntoIterator<Item = SharedPlugin>,
    {
        for plugin in plugins {
            let name = plugin.name().to_string();

            let added = {
                let mut state = self.state.write();
                if state.plugins.contains_key(&name) {
                    false
                } else {
                    state.plugins.insert(name.clone(), plugin.clone());
                    state.registry.push(plugin.clone());
                    true
                }
            };

            if !added {
                debug!(plugin = %name, "Plugin already registered, skipping");
                continue;
            }

            info!(plugin = %name, actions = ?plugin.actions(), "Plugin registered");
            self.events
                .emit(REGISTER, &CatalogEvent::Register { plugin })?;
        }
        Ok(self)
    }

    /// Removes each referenced plugin and emits `unregister` for it.
    ///
    /// Names that were never registered still emit `unregister`, with no
    /// plugin attached.
    pub fn unregister<I>(&self, plugins: I) -> AppResult<&Self>
    where
        I: IntoIterator,
        I::Item: Into<PluginRef>,
    {
        for entry in plugins {
            let entry: PluginRef = entry.into();
            self.remove(entry.name())?;
        }
        Ok(self)
    }

    /// Removes the plugin registered under `name`.
    pub fn unregister_by_name(&self, name: &str) -> AppResult<&Self> {
        self.remove(name)?;
        Ok(self)
    }

    /// Removes the plugin registered under `plugin`'s name.
    pub fn unregister_by_plugin(&self, plugin: &SharedPlugin) -> AppResult<&Self> {
        self.remove(plugin.name())?;
        Ok(self)
    }

    fn remove(&self, name: &str) -> AppResult<()> {
        let removed = {
            let mut state = self.state.write();
            let removed = state.plugins.remove(name);
            if let Some(plugin) = &removed {
                if let Some(index) = state.registry.iter().position(|p| Arc::ptr_eq(p, plugin)) {
                    state.registry.remove(index);
                }
            }
            removed
        };

        match &removed {
            Some(_) => info!(plugin = %name, "Plugin unregistered"),
            None => debug!(plugin = %name, "Unregistering unknown plugin"),
        }

        self.events.emit(
            UNREGISTER,
            &CatalogEvent::Unregister {
                name: name.to_string(),
                plugin: removed,
            },
        )
    }

    /// Plugin registered under `name`.
    pub fn get(&self, name: &str) -> Option<SharedPlugin> {
        self.state.read().plugins.get(name).cloned()
    }

    /// Returns whether a plugin is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.state.read().plugins.contains_key(name)
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.state.read().registry.len()
    }

    /// Returns whether no plugin is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered names in broadcast order.
    pub fn names(&self) -> Vec<String> {
        self.state
            .read()
            .registry
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Snapshot of the registered plugins in broadcast order.
    pub fn plugins(&self) -> Vec<SharedPlugin> {
        self.state.read().registry.clone()
    }

    /// Registers a catalog listener.
    pub fn on(&self, event_type: &str, listener: Listener<CatalogEvent>) {
        self.events.on(event_type, listener);
    }

    /// Registers a closure as catalog listener and returns its handle.
    pub fn listen<F>(&self, event_type: &str, f: F) -> Listener<CatalogEvent>
    where
        F: Fn(&CatalogEvent) -> AppResult<()> + Send + Sync + 'static,
    {
        self.events.listen(event_type, f)
    }

    /// Removes a catalog listener.
    pub fn off(&self, event_type: &str, listener: &Listener<CatalogEvent>) -> bool {
        self.events.off(event_type, listener)
    }
}

impl Default for PluginCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PluginCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginCatalog")
            .field("plugins", &self.names())
            .field("events", &self.events)
            .finish()
    }
}
