//! # pilot-core
//!
//! Core crate for pilot. Contains the unified error system, the
//! synchronous [`EventEmitter`](events::EventEmitter), the contract a
//! settings type must satisfy, and the host configuration schema.
//!
//! This crate has **no** internal dependencies on other pilot crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use events::{EventEmitter, Listener};
pub use result::AppResult;
