//! pilot host: wires configuration, logging, the root environment and the
//! plugin catalog together, then plugs and unplugs the built-in plugins.

mod builtins;

use std::sync::Arc;

use serde_json::json;
use tracing_subscriber::{EnvFilter, fmt};

use pilot_core::config::HostConfig;
use pilot_core::types::TypeRegistry;
use pilot_core::{AppError, AppResult};
use pilot_env::{EnvPayload, Environment, SetOptions, Settings};
use pilot_plugin::prelude::*;

fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config) {
        tracing::error!("Host error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration for the environment named by `PILOT_ENV`
fn load_configuration() -> Result<HostConfig, AppError> {
    let env = std::env::var("PILOT_ENV").unwrap_or_else(|_| "development".to_string());
    HostConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &HostConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

fn run(config: HostConfig) -> AppResult<()> {
    tracing::info!("Starting pilot host v{}", env!("CARGO_PKG_VERSION"));

    // ── Environment ──────────────────────────────────────────────
    let settings = Arc::new(Settings::new(TypeRegistry::new()));
    let env = Environment::new(settings);
    env.set(config.environment.variables.clone(), SetOptions::silent())?;
    env.listen("change", |event| {
        if let EnvPayload::Change { name, value, .. } = &event.payload {
            tracing::info!(name = %name, value = %value, "Environment changed");
        }
        Ok(())
    });
    tracing::info!(variables = ?env.local_keys(), "Root environment ready");

    // ── Plugin catalog ───────────────────────────────────────────
    let catalog = PluginCatalog::new();
    catalog.listen(ERROR, |event| {
        if let CatalogEvent::Error {
            action,
            plugin,
            error,
        } = event
        {
            tracing::error!(action = %action, plugin = %plugin.name(), error = %error, "Plugin failed");
        }
        Ok(())
    });

    let plugins: Vec<SharedPlugin> = builtins::all(&env)
        .into_iter()
        .filter(|p| config.plugins.is_enabled(p.name()))
        .collect();
    catalog.register(plugins)?;
    tracing::info!(plugins = ?catalog.names(), "Plugins registered");

    if !config.plugins.autoplug {
        tracing::info!("Autoplug disabled, leaving plugins idle");
        return Ok(());
    }

    let data = json!({ "host": "pilot", "version": env!("CARGO_PKG_VERSION") });
    catalog.plug(data.clone(), None)?;
    catalog.unplug(data, None);

    tracing::info!("Host finished");
    Ok(())
}
