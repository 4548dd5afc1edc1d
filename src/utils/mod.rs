//! Utility functions and helpers
//!
//! This module contains utility functions used throughout the application.

pub mod device;
pub mod version;

pub use device::{DEVICE_ID_LEN, generate_device_id};
pub use version::{VERSION, get_version};
