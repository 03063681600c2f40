//! Prelude for convenient imports.

pub use pilot_core::{AppError, AppResult, ErrorKind};

pub use crate::catalog::{PluginCatalog, PluginRef};
pub use crate::events::{CatalogEvent, ERROR, PLUG, REGISTER, UNPLUG, UNREGISTER};
pub use crate::plugin::{ActionPlugin, Plugin, SharedPlugin};
pub use crate::signal::SignalReport;

pub use crate::action_plugin;
