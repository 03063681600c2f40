//! # pilot-env
//!
//! Hierarchical environments for pilot hosts. An [`Environment`] binds
//! variables, resolves missing ones through its parent chain and announces
//! changes to listeners registered on the same scope. Every environment
//! carries the [`Settings`] store it was created with.

pub mod environment;
pub mod settings;

pub use environment::{EnvEvent, EnvPayload, Environment, SetOptions};
pub use settings::{SettingChange, SettingInfo, SettingSpec, Settings};
