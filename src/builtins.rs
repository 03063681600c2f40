//! Plugins compiled into the host.

use serde_json::{Value, json};
use tracing::info;

use pilot_env::Environment;
use pilot_plugin::prelude::*;

/// Logs every plug/unplug it receives.
fn announcer() -> SharedPlugin {
    action_plugin!("announcer", {
        PLUG => |params: &[Value], catalog: &PluginCatalog| {
            info!(params = ?params, plugins = catalog.len(), "Plugged");
            Ok(())
        },
        UNPLUG => |params: &[Value], _: &PluginCatalog| {
            info!(params = ?params, "Unplugged");
            Ok(())
        },
    })
}

/// Marks the environment as active while plugged.
fn session(env: &Environment) -> SharedPlugin {
    let on_plug = env.clone();
    let on_unplug = env.clone();
    action_plugin!("session", {
        PLUG => move |params: &[Value], _: &PluginCatalog| {
            let data = params.first().cloned().unwrap_or(Value::Null);
            on_plug.set(
                [("session.active", json!(true)), ("session.data", data)],
                Default::default(),
            )
        },
        UNPLUG => move |_: &[Value], _: &PluginCatalog| {
            on_unplug.set_one("session.active", json!(false))
        },
    })
}

/// All built-in plugins, in broadcast order.
pub fn all(env: &Environment) -> Vec<SharedPlugin> {
    vec![announcer(), session(env)]
}
