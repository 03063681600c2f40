//! Event emitter: listeners registered by event type, dispatched in
//! registration order.
//!
//! Dispatch is synchronous. A listener error aborts the remaining listeners of
//! that pass and is returned to whoever emitted; callers that need per-listener
//! isolation must provide it themselves.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::error::AppError;
use crate::result::AppResult;

/// A registered listener. Keep a clone of the `Arc` to remove it again.
pub type Listener<E> = Arc<dyn Fn(&E) -> AppResult<()> + Send + Sync>;

/// Publish/subscribe primitive keyed by event type name.
pub struct EventEmitter<E> {
    /// Event type → listeners in registration order.
    listeners: RwLock<HashMap<String, Vec<Listener<E>>>>,
}

impl<E: 'static> EventEmitter<E> {
    /// Creates an emitter with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
        }
    }

    /// Registers `listener` for `event_type`.
    ///
    /// The same listener may be registered more than once; it is then invoked
    /// once per registration.
    pub fn on(&self, event_type: &str, listener: Listener<E>) {
        let mut listeners = self.listeners.write();
        let entries = listeners.entry(event_type.to_string()).or_default();
        entries.push(listener);

        debug!(
            event_type = %event_type,
            listeners = entries.len(),
            "Listener registered"
        );
    }

    /// Wraps `f` into a [`Listener`], registers it and returns the handle.
    pub fn listen<F>(&self, event_type: &str, f: F) -> Listener<E>
    where
        F: Fn(&E) -> AppResult<()> + Send + Sync + 'static,
    {
        let listener: Listener<E> = Arc::new(f);
        self.on(event_type, listener.clone());
        listener
    }

    /// Removes the first registration of `listener` for `event_type`.
    ///
    /// Returns `false` when the listener was not registered.
    pub fn off(&self, event_type: &str, listener: &Listener<E>) -> bool {
        let mut listeners = self.listeners.write();
        let Some(entries) = listeners.get_mut(event_type) else {
            return false;
        };

        let Some(index) = entries.iter().position(|l| Arc::ptr_eq(l, listener)) else {
            return false;
        };
        entries.remove(index);

        if entries.is_empty() {
            listeners.remove(event_type);
        }

        debug!(event_type = %event_type, "Listener removed");
        true
    }

    /// Removes every listener for `event_type`.
    pub fn clear(&self, event_type: &str) {
        self.listeners.write().remove(event_type);
    }

    /// Invokes every listener registered for `event_type` with `event`.
    ///
    /// The listener list is snapshotted before the first call: listeners added
    /// or removed by a listener take effect from the next emission on.
    pub fn emit(&self, event_type: &str, event: &E) -> AppResult<()> {
        let snapshot: Vec<Listener<E>> = match self.listeners.read().get(event_type) {
            Some(entries) => entries.clone(),
            None => return Ok(()),
        };

        trace!(
            event_type = %event_type,
            listener_count = snapshot.len(),
            "Emitting event"
        );

        for listener in &snapshot {
            listener(event).map_err(|e| AppError::listener(event_type, e))?;
        }

        Ok(())
    }

    /// Returns the number of listeners registered for `event_type`.
    pub fn listener_count(&self, event_type: &str) -> usize {
        self.listeners
            .read()
            .get(event_type)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Returns whether any listener is registered for `event_type`.
    pub fn has_listeners(&self, event_type: &str) -> bool {
        self.listener_count(event_type) > 0
    }

    /// Returns all event types that currently have listeners.
    pub fn event_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.listeners.read().keys().cloned().collect();
        types.sort();
        types
    }
}

impl<E: 'static> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.read();
        let counts: HashMap<&str, usize> = listeners
            .iter()
            .map(|(ty, entries)| (ty.as_str(), entries.len()))
            .collect();
        f.debug_struct("EventEmitter")
            .field("listeners", &counts)
            .finish()
    }
}
