//! Error types for the unblocking pipeline
//!
//! Classifies failures by the stage that produced them so callers can tell a
//! recoverable per-server failure apart from a terminal one.

use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network/connection errors
    #[error("Network error: {message}")]
    Network {
        /// Error message describing the network issue
        message: String,
    },

    /// Timeout errors
    #[error("Operation timed out after {duration_secs} seconds: {operation}")]
    Timeout {
        /// The operation that timed out
        operation: String,
        /// Duration in seconds before timing out
        duration_secs: u64,
    },

    /// Non-success HTTP status from a backend
    #[error("{endpoint} answered with HTTP {status}")]
    Status {
        /// Endpoint that was contacted
        endpoint: String,
        /// HTTP status code
        status: u16,
    },

    /// Backend answered with its error flag set
    #[error("{endpoint} reported an error: {message}")]
    Endpoint {
        /// Endpoint that was contacted
        endpoint: String,
        /// Message supplied by the backend
        message: String,
    },

    /// Backend issued a session for the wrong region
    #[error("Session id from {endpoint} is not from the US (got {country_code})")]
    WrongRegion {
        /// Endpoint that was contacted
        endpoint: String,
        /// Country code the session resolved to
        country_code: String,
    },

    /// Every configured server failed
    #[error("No session id could be acquired after trying {attempts} server(s)")]
    Exhausted {
        /// Number of servers that were tried
        attempts: usize,
    },

    /// Cookie read or write failure
    #[error("Cookie '{name}' could not be updated: {message}")]
    Cookie {
        /// Cookie name
        name: String,
        /// Error message describing the failure
        message: String,
    },

    /// Credential login failure
    #[error("Login failed: {reason}")]
    Login {
        /// The reason why the login failed
        reason: String,
    },

    /// Credential cipher failure
    #[error("Credential decryption failed: {reason}")]
    Decrypt {
        /// The reason why decryption failed
        reason: String,
    },

    /// Key-value storage errors
    #[error("Storage error during {operation}: {details}")]
    Storage {
        /// The storage operation that failed
        operation: String,
        /// Detailed error description
        details: String,
    },

    /// Configuration errors
    #[error("Configuration error in {field}: {message}")]
    Config {
        /// The configuration field that has an error
        field: String,
        /// Error message describing the issue
        message: String,
    },

    /// Validation errors
    #[error("Validation failed for {field}: {message}")]
    Validation {
        /// The field that failed validation
        field: String,
        /// Error message describing the validation failure
        message: String,
    },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(operation: S, duration_secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration_secs,
        }
    }

    /// Create a status error
    pub fn status<S: Into<String>>(endpoint: S, status: u16) -> Self {
        Self::Status {
            endpoint: endpoint.into(),
            status,
        }
    }

    /// Create an endpoint-reported error
    pub fn endpoint<S: Into<String>>(endpoint: S, message: S) -> Self {
        Self::Endpoint {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a wrong region error
    pub fn wrong_region<S: Into<String>>(endpoint: S, country_code: S) -> Self {
        Self::WrongRegion {
            endpoint: endpoint.into(),
            country_code: country_code.into(),
        }
    }

    /// Create an exhaustion error
    pub fn exhausted(attempts: usize) -> Self {
        Self::Exhausted { attempts }
    }

    /// Create a cookie error
    pub fn cookie<S: Into<String>>(name: S, message: S) -> Self {
        Self::Cookie {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a login error
    pub fn login<S: Into<String>>(reason: S) -> Self {
        Self::Login {
            reason: reason.into(),
        }
    }

    /// Create a decryption error
    pub fn decrypt<S: Into<String>>(reason: S) -> Self {
        Self::Decrypt {
            reason: reason.into(),
        }
    }

    /// Create a storage error
    pub fn storage<S: Into<String>>(operation: S, details: S) -> Self {
        Self::Storage {
            operation: operation.into(),
            details: details.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(field: S, message: S) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether a failure against one server should move on to the next one
    pub fn allows_fallback(&self) -> bool {
        matches!(
            self,
            Error::Http(..)
                | Error::Json(..)
                | Error::Url(..)
                | Error::Network { .. }
                | Error::Timeout { .. }
                | Error::Status { .. }
                | Error::Endpoint { .. }
                | Error::WrongRegion { .. }
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Error::Http(..) => "http",
            Error::Json(..) => "json",
            Error::Url(..) => "url",
            Error::Io(..) => "io",
            Error::Network { .. } => "network",
            Error::Timeout { .. } => "timeout",
            Error::Status { .. } => "status",
            Error::Endpoint { .. } => "endpoint",
            Error::WrongRegion { .. } => "wrong_region",
            Error::Exhausted { .. } => "exhausted",
            Error::Cookie { .. } => "cookie",
            Error::Login { .. } => "login",
            Error::Decrypt { .. } => "decrypt",
            Error::Storage { .. } => "storage",
            Error::Config { .. } => "config",
            Error::Validation { .. } => "validation",
        }
    }
}
