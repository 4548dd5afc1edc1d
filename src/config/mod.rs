//! Configuration management for the unblocker
//!
//! This module handles loading and managing configuration settings
//! for the library and the command-line tool.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::Settings;

// Shared by every test that reads or writes process environment variables
#[cfg(test)]
pub(crate) static ENV_TEST_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
