//! Integration tests across the pilot crates.

mod catalog_test;
mod environment_test;
mod helpers;
mod settings_test;
