//! Host configuration schemas.
//!
//! Deserialized from TOML files via the `config` crate. Each sub-module
//! represents a logical configuration section.

pub mod environment;
pub mod logging;
pub mod plugin;

use serde::{Deserialize, Serialize};

use self::environment::EnvironmentConfig;
use self::logging::LoggingConfig;
use self::plugin::PluginConfig;

use crate::error::AppError;

/// Root host configuration.
///
/// The merged result of `config/default.toml`, an environment-specific
/// overlay and `PILOT__*` environment variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Plugin catalog settings.
    #[serde(default)]
    pub plugins: PluginConfig,
    /// Root environment seed.
    #[serde(default)]
    pub environment: EnvironmentConfig,
}

impl HostConfig {
    /// Load configuration for the named deployment environment.
    ///
    /// Merges `config/default`, `config/{env}` and environment variables
    /// prefixed with `PILOT`. Missing files are not an error.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config", env)
    }

    /// Same as [`load`](Self::load) with an explicit configuration directory.
    pub fn load_from(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("PILOT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Parse configuration from a TOML string, applying section defaults.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
