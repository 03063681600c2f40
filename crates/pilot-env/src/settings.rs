//! Settings store: named values whose type is resolved through a
//! [`TypeRegistry`] when the setting is defined.

use std::collections::BTreeMap;
use std::fmt;

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use pilot_core::events::{EventEmitter, Listener};
use pilot_core::types::{Conversion, SelectionData, SettingType, Step, TypeRegistry};
use pilot_core::{AppError, AppResult};

/// Declaration of a setting.
#[derive(Debug, Clone)]
pub struct SettingSpec {
    /// Unique setting name.
    pub name: String,
    /// Name of the settings type in the registry.
    pub type_name: String,
    /// Initial and reset value, parsed through the type.
    pub default: Value,
    /// Short description.
    pub description: String,
}

impl SettingSpec {
    /// Creates a spec with an empty description.
    pub fn new(name: &str, type_name: &str, default: Value) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
            default,
            description: String::new(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

/// Public view of a defined setting.
#[derive(Debug, Clone, Serialize)]
pub struct SettingInfo {
    /// Setting name.
    pub name: String,
    /// Type name.
    pub type_name: String,
    /// Description.
    pub description: String,
    /// Default value.
    pub default: Value,
    /// Current value.
    pub value: Value,
}

/// Payload of `change` / `change:<name>` events.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingChange {
    /// Setting name.
    pub name: String,
    /// New value.
    pub value: Value,
    /// Value before the change.
    pub previous: Value,
}

struct Setting {
    spec: SettingSpec,
    ty: SettingType,
    default: Value,
    value: Value,
}

/// Store of typed settings shared by an environment hierarchy.
pub struct Settings {
    /// Types settings may reference.
    types: TypeRegistry,
    /// Setting name → definition and current value.
    entries: RwLock<BTreeMap<String, Setting>>,
    /// Change notifications.
    events: EventEmitter<SettingChange>,
}

impl Settings {
    /// Creates an empty store over `types`.
    pub fn new(types: TypeRegistry) -> Self {
        Self {
            types,
            entries: RwLock::new(BTreeMap::new()),
            events: EventEmitter::new(),
        }
    }

    /// The registry settings types are resolved against.
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Defines a new setting.
    ///
    /// Fails immediately when the type is unknown, the default is rejected by
    /// the type, or the name is taken.
    pub fn define(&self, spec: SettingSpec) -> AppResult<()> {
        let ty = self.types.resolve(&spec.type_name)?;
        let default = expect_valid(&spec.name, ty.parse(&spec.default))?;

        let mut entries = self.entries.write();
        if entries.contains_key(&spec.name) {
            return Err(AppError::conflict(format!(
                "Setting '{}' is already defined",
                spec.name
            )));
        }

        info!(setting = %spec.name, type_name = %spec.type_name, "Setting defined");

        entries.insert(
            spec.name.clone(),
            Setting {
                spec,
                ty,
                value: default.clone(),
                default,
            },
        );
        Ok(())
    }

    /// Current value of a setting.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.entries.read().get(name).map(|s| s.value.clone())
    }

    /// Returns whether a setting is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// Defined setting names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// Describes a setting.
    pub fn describe(&self, name: &str) -> Option<SettingInfo> {
        self.entries.read().get(name).map(|s| SettingInfo {
            name: s.spec.name.clone(),
            type_name: s.spec.type_name.clone(),
            description: s.spec.description.clone(),
            default: s.default.clone(),
            value: s.value.clone(),
        })
    }

    /// Parses `input` through the setting's type and stores the result.
    ///
    /// Returns the stored value.
    pub fn set(&self, name: &str, input: Value) -> AppResult<Value> {
        let ty = self.type_of(name)?;
        let value = expect_valid(name, ty.parse(&input))?;
        self.store(name, value)
    }

    /// Like [`set`](Self::set) for textual input; enumerated types look the
    /// text up through `from_string` first.
    pub fn set_from_str(&self, name: &str, text: &str) -> AppResult<Value> {
        let ty = self.type_of(name)?;
        let input = ty
            .from_string(text)
            .unwrap_or_else(|| Value::String(text.to_string()));
        let value = expect_valid(name, ty.parse(&input))?;
        self.store(name, value)
    }

    /// Steps a steppable setting up.
    pub fn increment(&self, name: &str) -> AppResult<Value> {
        self.step(name, Step::Up)
    }

    /// Steps a steppable setting down.
    pub fn decrement(&self, name: &str) -> AppResult<Value> {
        self.step(name, Step::Down)
    }

    /// Restores a setting to its default.
    pub fn reset(&self, name: &str) -> AppResult<Value> {
        let default = self
            .entries
            .read()
            .get(name)
            .map(|s| s.default.clone())
            .ok_or_else(|| not_defined(name))?;
        self.store(name, default)
    }

    /// Current value rendered by the setting's type.
    pub fn to_display(&self, name: &str) -> Option<String> {
        let (ty, value) = self.current(name).ok()?;
        Some(ty.stringify(&value))
    }

    /// Options of an enumerated setting.
    pub fn options(&self, name: &str) -> Option<Vec<Value>> {
        let (ty, _) = self.current(name).ok()?;
        let data: SelectionData = ty.selection()?;
        Some(data.values())
    }

    /// Registers a change listener.
    pub fn on(&self, event_type: &str, listener: Listener<SettingChange>) {
        self.events.on(event_type, listener);
    }

    /// Registers a closure as change listener and returns its handle.
    pub fn listen<F>(&self, event_type: &str, f: F) -> Listener<SettingChange>
    where
        F: Fn(&SettingChange) -> AppResult<()> + Send + Sync + 'static,
    {
        self.events.listen(event_type, f)
    }

    /// Removes a change listener.
    pub fn off(&self, event_type: &str, listener: &Listener<SettingChange>) -> bool {
        self.events.off(event_type, listener)
    }

    fn type_of(&self, name: &str) -> AppResult<SettingType> {
        self.entries
            .read()
            .get(name)
            .map(|s| s.ty.clone())
            .ok_or_else(|| not_defined(name))
    }

    /// Type and current value, cloned so descriptor code runs unlocked.
    fn current(&self, name: &str) -> AppResult<(SettingType, Value)> {
        self.entries
            .read()
            .get(name)
            .map(|s| (s.ty.clone(), s.value.clone()))
            .ok_or_else(|| not_defined(name))
    }

    fn step(&self, name: &str, step: Step) -> AppResult<Value> {
        let (ty, value) = self.current(name)?;
        let next = ty.step(&value, step).ok_or_else(|| {
            AppError::validation(format!("Setting '{name}' cannot be stepped"))
        })?;
        self.store(name, next)
    }

    /// Stores an already-parsed value and notifies listeners when it changed.
    fn store(&self, name: &str, value: Value) -> AppResult<Value> {
        let previous = {
            let mut entries = self.entries.write();
            let setting = entries.get_mut(name).ok_or_else(|| not_defined(name))?;
            if setting.value == value {
                return Ok(value);
            }
            std::mem::replace(&mut setting.value, value.clone())
        };

        debug!(setting = %name, "Setting changed");

        let change = SettingChange {
            name: name.to_string(),
            value: value.clone(),
            previous,
        };
        self.events.emit("change", &change)?;
        self.events.emit(&format!("change:{name}"), &change)?;
        Ok(value)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(TypeRegistry::new())
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("types", &self.types.names())
            .field("settings", &self.names())
            .finish()
    }
}

fn not_defined(name: &str) -> AppError {
    AppError::not_found(format!("Setting '{name}' is not defined"))
}

fn expect_valid(name: &str, conversion: Conversion) -> AppResult<Value> {
    match conversion {
        Conversion::Valid(value) => Ok(value),
        Conversion::Rejected { message, .. } => Err(AppError::validation(format!(
            "Invalid value for setting '{name}': {message}"
        ))),
    }
}
