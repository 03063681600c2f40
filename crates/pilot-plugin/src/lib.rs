//! # pilot-plugin
//!
//! Plugin catalog for pilot hosts. Provides:
//!
//! - Registration keyed by plugin name, first registration wins
//! - Removal by name or by plugin handle
//! - Broadcasting named actions (`plug`, `unplug` or custom ones) with
//!   per-plugin failure isolation
//! - Catalog events for every registration, removal, delivery and failure

#[macro_use]
mod macros;

pub mod catalog;
pub mod events;
pub mod plugin;
pub mod prelude;
pub mod signal;

pub use catalog::{PluginCatalog, PluginRef};
pub use events::CatalogEvent;
pub use plugin::{ActionPlugin, ActionPluginBuilder, Plugin, SharedPlugin};
pub use signal::SignalReport;
