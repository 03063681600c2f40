//! Plugin catalog configuration.

use serde::{Deserialize, Serialize};

/// Plugin catalog configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Whether the host plugs the built-in plugins on startup.
    #[serde(default = "default_true")]
    pub autoplug: bool,
    /// Names of built-in plugins that are never registered.
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl PluginConfig {
    /// Returns whether the plugin with `name` may be registered.
    pub fn is_enabled(&self, name: &str) -> bool {
        !self.disabled.iter().any(|d| d == name)
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            autoplug: default_true(),
            disabled: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}
