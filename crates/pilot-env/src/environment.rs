//! Environment: a hub shared by the components of a host instance.
//!
//! Components share state by binding variables in an environment and talk to
//! each other through its events. Sub-environments resolve missing variables
//! through their parent, so shared components live in the parent and
//! instance-specific ones in the children.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, trace};

use pilot_core::AppResult;
use pilot_core::events::{EventEmitter, Listener};

use crate::settings::Settings;

/// What an environment event carries besides its source.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvPayload {
    /// A variable changed.
    Change {
        /// Variable name.
        name: String,
        /// New value.
        value: Value,
        /// Value bound in the emitting scope before the change, if any.
        previous: Option<Value>,
    },
    /// Free-form message between components.
    Custom(Value),
}

/// Event dispatched by an [`Environment`].
#[derive(Debug, Clone)]
pub struct EnvEvent {
    /// The scope that emitted the event.
    pub env: Environment,
    /// Event data.
    pub payload: EnvPayload,
}

/// Options for [`Environment::set`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SetOptions {
    /// Bind without emitting change events.
    pub silent: bool,
}

impl SetOptions {
    /// Options that suppress change events.
    pub fn silent() -> Self {
        Self { silent: true }
    }
}

struct Scope {
    /// Variables bound in this scope only.
    variables: RwLock<HashMap<String, Value>>,
    /// Scope consulted for variables missing here.
    parent: Option<Environment>,
    /// Settings shared by the whole hierarchy.
    settings: Arc<Settings>,
    /// Listeners of this scope.
    events: EventEmitter<EnvEvent>,
}

/// Handle to a scope in an environment hierarchy. Clones share the scope.
#[derive(Clone)]
pub struct Environment {
    scope: Arc<Scope>,
}

impl Environment {
    /// Creates a root environment over `settings`.
    pub fn new(settings: Arc<Settings>) -> Self {
        Self::with_parent(None, settings)
    }

    fn with_parent(parent: Option<Environment>, settings: Arc<Settings>) -> Self {
        Self {
            scope: Arc::new(Scope {
                variables: RwLock::new(HashMap::new()),
                parent,
                settings,
                events: EventEmitter::new(),
            }),
        }
    }

    /// Creates a sub-environment that inherits this one's variables and
    /// settings.
    pub fn child(&self) -> Self {
        let child = Self::with_parent(Some(self.clone()), self.scope.settings.clone());
        debug!(depth = child.depth(), "Sub-environment created");
        child
    }

    /// Parent scope, if any.
    pub fn parent(&self) -> Option<&Environment> {
        self.scope.parent.as_ref()
    }

    /// Number of ancestors; a root has depth 0.
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    fn ancestors(&self) -> impl Iterator<Item = &Environment> {
        std::iter::successors(self.parent(), |&env| env.parent())
    }

    /// Settings shared by this hierarchy.
    pub fn settings(&self) -> &Arc<Settings> {
        &self.scope.settings
    }

    /// Returns whether both handles refer to the same scope.
    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Arc::ptr_eq(&self.scope, &other.scope)
    }

    /// Value of `name` in this scope or the nearest ancestor that binds it.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.get_local(name)
            .or_else(|| self.parent().and_then(|parent| parent.get(name)))
    }

    /// Value of `name` bound in this scope, ignoring ancestors.
    pub fn get_local(&self, name: &str) -> Option<Value> {
        self.scope.variables.read().get(name).cloned()
    }

    /// Returns whether `name` resolves anywhere in the chain.
    pub fn has(&self, name: &str) -> bool {
        self.has_local(name) || self.ancestors().any(|env| env.has_local(name))
    }

    /// Returns whether `name` is bound in this scope.
    pub fn has_local(&self, name: &str) -> bool {
        self.scope.variables.read().contains_key(name)
    }

    /// Names bound in this scope, sorted.
    pub fn local_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.scope.variables.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Binds each `(name, value)` in order.
    ///
    /// A key whose value equals the one bound in this scope is skipped. Other
    /// keys are bound and, unless `options.silent`, announced with `change`
    /// and `change:<name>` on this scope. Keys are independent: a listener
    /// error stops the batch but earlier keys stay bound.
    pub fn set<I, K>(&self, variables: I, options: SetOptions) -> AppResult<()>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        for (name, value) in variables {
            self.set_variable(name.into(), value, options)?;
        }
        Ok(())
    }

    /// Binds a single variable with default options.
    pub fn set_one(&self, name: &str, value: Value) -> AppResult<()> {
        self.set_variable(name.to_string(), value, SetOptions::default())
    }

    /// Binds every entry of a JSON object.
    pub fn set_map(
        &self,
        variables: &serde_json::Map<String, Value>,
        options: SetOptions,
    ) -> AppResult<()> {
        self.set(
            variables.iter().map(|(k, v)| (k.clone(), v.clone())),
            options,
        )
    }

    fn set_variable(&self, name: String, value: Value, options: SetOptions) -> AppResult<()> {
        let previous = {
            let mut variables = self.scope.variables.write();
            let previous = variables.get(&name).cloned();
            if previous.as_ref() == Some(&value) {
                return Ok(());
            }
            variables.insert(name.clone(), value.clone());
            previous
        };

        if options.silent {
            trace!(name = %name, "Variable set silently");
            return Ok(());
        }

        debug!(name = %name, depth = self.depth(), "Variable changed");

        let event_type = format!("change:{name}");
        let payload = EnvPayload::Change {
            name,
            value,
            previous,
        };
        self.emit("change", payload.clone())?;
        self.emit(&event_type, payload)
    }

    /// Dispatches `payload` to this scope's listeners, stamped with this
    /// scope as the event source.
    pub fn emit(&self, event_type: &str, payload: EnvPayload) -> AppResult<()> {
        let event = EnvEvent {
            env: self.clone(),
            payload,
        };
        self.scope.events.emit(event_type, &event)
    }

    /// Registers a listener on this scope.
    pub fn on(&self, event_type: &str, listener: Listener<EnvEvent>) {
        self.scope.events.on(event_type, listener);
    }

    /// Registers a closure on this scope and returns its handle.
    pub fn listen<F>(&self, event_type: &str, f: F) -> Listener<EnvEvent>
    where
        F: Fn(&EnvEvent) -> AppResult<()> + Send + Sync + 'static,
    {
        self.scope.events.listen(event_type, f)
    }

    /// Removes a listener from this scope.
    pub fn off(&self, event_type: &str, listener: &Listener<EnvEvent>) -> bool {
        self.scope.events.off(event_type, listener)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("depth", &self.depth())
            .field("variables", &self.local_keys())
            .finish()
    }
}
