//! Events emitted by the plugin catalog.

use serde_json::Value;

use pilot_core::AppError;

use crate::plugin::SharedPlugin;

/// Event type emitted when a plugin joins the catalog.
pub const REGISTER: &str = "register";
/// Event type emitted when a plugin leaves the catalog.
pub const UNREGISTER: &str = "unregister";
/// Event type emitted when delivering an action to a plugin failed.
pub const ERROR: &str = "error";
/// Action broadcast by [`PluginCatalog::plug`](crate::PluginCatalog::plug).
pub const PLUG: &str = "plug";
/// Action broadcast by [`PluginCatalog::unplug`](crate::PluginCatalog::unplug).
pub const UNPLUG: &str = "unplug";

/// Payload of every catalog event.
#[derive(Debug, Clone)]
pub enum CatalogEvent {
    /// Emitted as `register`.
    Register {
        /// The plugin that was added.
        plugin: SharedPlugin,
    },
    /// Emitted as `unregister`.
    Unregister {
        /// The name that was asked to be removed.
        name: String,
        /// The removed plugin; `None` when nothing was registered under `name`.
        plugin: Option<SharedPlugin>,
    },
    /// Emitted under the action's own name once per signalled plugin.
    Action {
        /// The action that was broadcast.
        action: String,
        /// The plugin the action was delivered to.
        plugin: SharedPlugin,
        /// Parameters passed to the handler.
        data: Vec<Value>,
    },
    /// Emitted as `error` when delivering an action to a plugin failed.
    Error {
        /// The action being broadcast.
        action: String,
        /// The plugin whose delivery failed.
        plugin: SharedPlugin,
        /// What went wrong.
        error: AppError,
    },
}

impl CatalogEvent {
    /// The plugin the event refers to, if any.
    pub fn plugin(&self) -> Option<&SharedPlugin> {
        match self {
            Self::Register { plugin }
            | Self::Action { plugin, .. }
            | Self::Error { plugin, .. } => Some(plugin),
            Self::Unregister { plugin, .. } => plugin.as_ref(),
        }
    }

    /// Name of the plugin the event refers to, if any.
    pub fn plugin_name(&self) -> Option<&str> {
        match self {
            Self::Unregister { name, .. } => Some(name),
            other => other.plugin().map(|p| p.name()),
        }
    }
}
