//! Shared test helpers for integration tests.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Value, json};

use pilot_core::types::{Conversion, SettingType, TypeDescriptor, TypeRegistry};
use pilot_env::{Environment, Settings};
use pilot_plugin::prelude::*;

/// Ordered record of what listeners and handlers observed.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().iter().filter(|e| *e == entry).count()
    }
}

/// Records `<event type>:<plugin name>` for every catalog event of `event_type`.
pub fn watch(catalog: &PluginCatalog, event_type: &str, journal: &Journal) {
    let journal = journal.clone();
    let tag = event_type.to_string();
    catalog.listen(event_type, move |event| {
        journal.push(format!("{tag}:{}", event.plugin_name().unwrap_or("-")));
        Ok(())
    });
}

/// Plugin that records `<name>.<action>` for each of `actions`.
pub fn recording_plugin(name: &str, actions: &[&str], journal: &Journal) -> SharedPlugin {
    let mut builder = ActionPlugin::builder(name);
    for action in actions {
        let journal = journal.clone();
        let entry = format!("{name}.{action}");
        builder = builder.on(action, move |_, _| {
            journal.push(entry.clone());
            Ok(())
        });
    }
    builder.shared()
}

/// Integer type that steps by one.
#[derive(Debug)]
pub struct Integer;

impl TypeDescriptor for Integer {
    fn parse(&self, input: &Value) -> Conversion {
        match input {
            Value::Number(n) if n.is_i64() => Conversion::Valid(input.clone()),
            Value::String(text) => match text.trim().parse::<i64>() {
                Ok(n) => Conversion::Valid(json!(n)),
                Err(_) => Conversion::invalid(format!("'{text}' is not an integer")),
            },
            _ => Conversion::invalid("expected an integer"),
        }
    }

    fn stringify(&self, value: &Value) -> String {
        value.to_string()
    }

    fn increment(&self, value: &Value) -> Option<Value> {
        value.as_i64().map(|n| json!(n + 1))
    }

    fn decrement(&self, value: &Value) -> Option<Value> {
        value.as_i64().map(|n| json!(n - 1))
    }
}

/// Registry with `integer` and a suggestion-only `text` type.
pub fn registry() -> TypeRegistry {
    TypeRegistry::new()
        .with("integer", SettingType::descriptor(Integer))
        .with(
            "text",
            SettingType::suggest(|input| match input {
                Value::String(_) => vec![input.clone()],
                _ => Vec::new(),
            }),
        )
}

/// Root environment over an empty settings store.
pub fn root_env() -> Environment {
    Environment::new(Arc::new(Settings::new(registry())))
}
