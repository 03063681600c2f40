//! Signalling: broadcasting an action to a set of plugins.
//!
//! Each plugin is handled on its own:
//! - If the plugin handles the action, its handler runs with the parameters.
//! - The action is then emitted on the catalog, whether or not a handler ran.
//! - A failure in either step is reported as an `error` event for that plugin
//!   and the broadcast moves on to the next one.
//!
//! The target list is collected before the first delivery, so plugins
//! registered or unregistered by a handler do not change who receives the
//! broadcast in flight.

use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use pilot_core::{AppError, AppResult};

use crate::catalog::PluginCatalog;
use crate::events::{CatalogEvent, ERROR, PLUG, UNPLUG};
use crate::plugin::SharedPlugin;

/// Outcome of a broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignalReport {
    /// The action that was broadcast.
    pub action: String,
    /// Plugins the action was delivered to.
    pub visited: usize,
    /// Plugins whose handler ran without failing.
    pub invoked: usize,
    /// Names of plugins whose delivery failed, in broadcast order.
    pub failed: Vec<String>,
}

impl SignalReport {
    /// Returns whether every delivery succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

impl PluginCatalog {
    /// Broadcasts `action` with `params` to `plugins`, in order.
    pub fn signal<I>(&self, plugins: I, action: &str, params: &[Value]) -> &Self
    where
        I: IntoIterator<Item = SharedPlugin>,
    {
        self.signal_with_report(plugins, action, params);
        self
    }

    /// Broadcasts `action` to every registered plugin.
    pub fn signal_all(&self, action: &str, params: &[Value]) -> &Self {
        self.signal(self.plugins(), action, params)
    }

    /// Like [`signal`](Self::signal), returning what happened.
    pub fn signal_with_report<I>(
        &self,
        plugins: I,
        action: &str,
        params: &[Value],
    ) -> SignalReport
    where
        I: IntoIterator<Item = SharedPlugin>,
    {
        let targets: Vec<SharedPlugin> = plugins.into_iter().collect();

        debug!(
            action = %action,
            plugin_count = targets.len(),
            "Signalling plugins"
        );

        let mut report = SignalReport {
            action: action.to_string(),
            ..SignalReport::default()
        };

        for plugin in targets {
            report.visited += 1;

            if let Err(err) = self.deliver(&plugin, action, params, &mut report) {
                warn!(
                    action = %action,
                    plugin = %plugin.name(),
                    error = %err,
                    "Plugin failed to handle action"
                );
                report.failed.push(plugin.name().to_string());
                self.report_failure(action, plugin, err);
            }
        }

        report
    }

    /// Registers `plugins` (when given) and broadcasts `plug` with `data` to
    /// exactly them; otherwise broadcasts to every registered plugin.
    pub fn plug(&self, data: Value, plugins: Option<Vec<SharedPlugin>>) -> AppResult<&Self> {
        let targets = match plugins {
            Some(plugins) => {
                self.register(plugins.iter().cloned())?;
                plugins
            }
            None => self.plugins(),
        };
        Ok(self.signal(targets, PLUG, &[data]))
    }

    /// Broadcasts `unplug` with `data` to `plugins`, or to every registered
    /// plugin. Membership is left unchanged.
    pub fn unplug(&self, data: Value, plugins: Option<Vec<SharedPlugin>>) -> &Self {
        let targets = plugins.unwrap_or_else(|| self.plugins());
        self.signal(targets, UNPLUG, &[data])
    }

    /// Runs the handler (if any) and emits the action. A panic in either step
    /// is turned into a plugin error.
    fn deliver(
        &self,
        plugin: &SharedPlugin,
        action: &str,
        params: &[Value],
        report: &mut SignalReport,
    ) -> AppResult<()> {
        isolate(plugin, action, || {
            if plugin.handles(action) {
                plugin.invoke(action, params, self)?;
                report.invoked += 1;
            }

            self.events.emit(
                action,
                &CatalogEvent::Action {
                    action: action.to_string(),
                    plugin: plugin.clone(),
                    data: params.to_vec(),
                },
            )
        })
    }

    fn report_failure(&self, action: &str, plugin: SharedPlugin, err: AppError) {
        let name = plugin.name().to_string();
        let event = CatalogEvent::Error {
            action: action.to_string(),
            plugin,
            error: err,
        };

        if let Err(listener_err) = self.events.emit(ERROR, &event) {
            error!(
                action = %action,
                plugin = %name,
                error = %listener_err,
                "Error listener failed, dropping"
            );
        }
    }
}

/// Runs one plugin's delivery, turning a panic into a plugin error.
fn isolate<F>(plugin: &SharedPlugin, action: &str, delivery: F) -> AppResult<()>
where
    F: FnOnce() -> AppResult<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(delivery)) {
        Ok(result) => result,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(AppError::plugin(format!(
                "Plugin '{}' panicked handling '{action}': {reason}",
                plugin.name()
            )))
        }
    }
}
