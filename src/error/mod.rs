//! Error handling for the unblocker
//!
//! This module defines error types and handling patterns used throughout the application.

pub mod formatting;
pub mod types;

pub use formatting::{
    EXHAUSTED_NOTICE, LOGIN_FAILED_NOTICE, format_error, format_error_for_logging,
    format_error_for_user,
};
pub use types::{Error, Result};
