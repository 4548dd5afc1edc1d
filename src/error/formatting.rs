//! Error formatting utilities
//!
//! Renders errors for diagnostics logs and for the plain-text notifications
//! shown to the user.

use crate::Error;
use serde_json;
use std::error::Error as StdError;

/// Notification text when no server handed out a session id
pub const EXHAUSTED_NOTICE: &str =
    "CR-Unblocker couldn't get a session id. Delaying retry for a minute ...";

/// Notification text when the stored credentials were rejected
pub const LOGIN_FAILED_NOTICE: &str = "Failed to login, please log in manually.";

/// Format error for display
///
/// Appends the chain of underlying causes that are not already part of the
/// top-level message.
pub fn format_error(error: &Error) -> String {
    let formatted = match error {
        Error::Status { endpoint, status } => {
            format!("HTTP {} from {}", status, endpoint)
        }

        Error::Timeout {
            operation,
            duration_secs,
        } => {
            format!(
                "Operation '{}' timed out after {} seconds",
                operation, duration_secs
            )
        }

        Error::Cookie { name, message } => {
            format!("Cookie '{}' could not be updated: {}", name, message)
        }

        _ => error.to_string(),
    };

    let mut result = formatted;
    let mut source = error.source();

    while let Some(cause) = source {
        if !result.contains(&cause.to_string()) {
            result = format!("{} (caused by {})", result, cause);
        }
        source = cause.source();
    }

    result
}

/// Format error as the plain-text message surfaced to the user
///
/// Only exhaustion and login failures are user-visible; everything else
/// returns `None` and is left to the diagnostics log.
pub fn format_error_for_user(error: &Error) -> Option<&'static str> {
    match error {
        Error::Exhausted { .. } => Some(EXHAUSTED_NOTICE),
        Error::Login { .. } | Error::Decrypt { .. } => Some(LOGIN_FAILED_NOTICE),
        _ => None,
    }
}

/// Format error for logging with structured data
pub fn format_error_for_logging(error: &Error) -> serde_json::Value {
    let mut log_data = serde_json::json!({
        "message": format_error(error),
        "category": error.category(),
        "fallback": error.allows_fallback(),
    });

    match error {
        Error::Status { endpoint, status } => {
            log_data["endpoint"] = serde_json::Value::String(endpoint.clone());
            log_data["status"] = serde_json::Value::Number((*status).into());
        }
        Error::Endpoint { endpoint, .. } => {
            log_data["endpoint"] = serde_json::Value::String(endpoint.clone());
        }
        Error::WrongRegion {
            endpoint,
            country_code,
        } => {
            log_data["endpoint"] = serde_json::Value::String(endpoint.clone());
            log_data["country_code"] = serde_json::Value::String(country_code.clone());
        }
        Error::Exhausted { attempts } => {
            log_data["attempts"] = serde_json::Value::Number((*attempts).into());
        }
        Error::Timeout { duration_secs, .. } => {
            log_data["timeout_duration"] = serde_json::Value::Number((*duration_secs).into());
        }
        _ => {}
    }

    log_data
}
