//! Plugin trait and a closure-backed implementation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use pilot_core::AppResult;

use crate::catalog::PluginCatalog;

/// Shared handle to a plugin as stored by the catalog.
pub type SharedPlugin = Arc<dyn Plugin>;

/// An object the catalog can register and signal.
///
/// Only [`name`](Plugin::name) is required. A plugin that handles no action
/// still receives every broadcast as a no-op.
pub trait Plugin: Send + Sync + fmt::Debug {
    /// Unique name within a catalog.
    fn name(&self) -> &str;

    /// Returns whether this plugin has a handler for `action`.
    fn handles(&self, _action: &str) -> bool {
        false
    }

    /// Runs the handler for `action`. Only called when
    /// [`handles`](Plugin::handles) returned `true`.
    ///
    /// `catalog` is the catalog performing the broadcast; handlers may
    /// register, unregister or signal through it.
    fn invoke(
        &self,
        _action: &str,
        _params: &[Value],
        _catalog: &PluginCatalog,
    ) -> AppResult<()> {
        Ok(())
    }

    /// Names of the actions this plugin handles, if it can enumerate them.
    fn actions(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Handler stored by [`ActionPlugin`].
pub type ActionHandler = Arc<dyn Fn(&[Value], &PluginCatalog) -> AppResult<()> + Send + Sync>;

/// A plugin whose actions are closures keyed by action name.
#[derive(Clone)]
pub struct ActionPlugin {
    /// Plugin name.
    name: String,
    /// Action name → handler.
    handlers: HashMap<String, ActionHandler>,
}

impl ActionPlugin {
    /// Starts building a plugin called `name`.
    pub fn builder(name: &str) -> ActionPluginBuilder {
        ActionPluginBuilder {
            name: name.to_string(),
            handlers: HashMap::new(),
        }
    }

    /// Wraps the plugin for registration.
    pub fn into_shared(self) -> SharedPlugin {
        Arc::new(self)
    }
}

impl Plugin for ActionPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn handles(&self, action: &str) -> bool {
        self.handlers.contains_key(action)
    }

    fn invoke(&self, action: &str, params: &[Value], catalog: &PluginCatalog) -> AppResult<()> {
        match self.handlers.get(action) {
            Some(handler) => handler(params, catalog),
            None => Ok(()),
        }
    }

    fn actions(&self) -> Vec<String> {
        let mut actions: Vec<String> = self.handlers.keys().cloned().collect();
        actions.sort();
        actions
    }
}

impl fmt::Debug for ActionPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionPlugin")
            .field("name", &self.name)
            .field("actions", &self.actions())
            .finish()
    }
}

/// Builder for [`ActionPlugin`].
pub struct ActionPluginBuilder {
    /// Plugin name.
    name: String,
    /// Accumulated handlers.
    handlers: HashMap<String, ActionHandler>,
}

impl ActionPluginBuilder {
    /// Adds (or replaces) the handler for `action`.
    pub fn on<F>(mut self, action: &str, handler: F) -> Self
    where
        F: Fn(&[Value], &PluginCatalog) -> AppResult<()> + Send + Sync + 'static,
    {
        self.handlers.insert(action.to_string(), Arc::new(handler));
        self
    }

    /// Builds the plugin.
    pub fn build(self) -> ActionPlugin {
        ActionPlugin {
            name: self.name,
            handlers: self.handlers,
        }
    }

    /// Builds the plugin and wraps it for registration.
    pub fn shared(self) -> SharedPlugin {
        self.build().into_shared()
    }
}

impl fmt::Debug for ActionPluginBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionPluginBuilder")
            .field("name", &self.name)
            .field("actions", &self.handlers.len())
            .finish()
    }
}
