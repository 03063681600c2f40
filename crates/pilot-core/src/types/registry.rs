//! Type registry: settings types looked up by name.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::descriptor::SettingType;
use crate::error::AppError;
use crate::result::AppResult;

/// Table of settings types keyed by type name.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    /// Type name → type.
    types: HashMap<String, SettingType>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `ty` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: &str, ty: SettingType) -> &mut Self {
        if self.types.insert(name.to_string(), ty).is_some() {
            warn!(type_name = %name, "Settings type replaced");
        } else {
            debug!(type_name = %name, "Settings type registered");
        }
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, name: &str, ty: SettingType) -> Self {
        self.register(name, ty);
        self
    }

    /// Resolves a type by name, failing immediately when it is unknown.
    pub fn resolve(&self, name: &str) -> AppResult<SettingType> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::unknown_type(name))
    }

    /// Returns whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.keys().cloned().collect();
        names.sort();
        names
    }
}
