//! Root environment seed configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Variables bound in the root environment before any component runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Variable name → initial value.
    #[serde(default)]
    pub variables: BTreeMap<String, Value>,
}
