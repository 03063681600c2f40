//! Event primitives shared by environments, settings and the plugin catalog.

pub mod emitter;

pub use emitter::{EventEmitter, Listener};
