//! Session and authentication payloads exchanged with the backends

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Expiration as reported by the backends
///
/// Backends answer either with a unix timestamp or with a date string; the
/// value is persisted exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expiration {
    /// Unix timestamp in seconds
    Timestamp(i64),
    /// Backend formatted date
    Text(String),
}

impl fmt::Display for Expiration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expiration::Timestamp(ts) => write!(f, "{}", ts),
            Expiration::Text(text) => f.write_str(text),
        }
    }
}

/// User attached to a session or login grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
}

/// Session handed out by a start-session backend
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub session_id: String,
    pub country_code: String,
    #[serde(default)]
    pub expires: Option<Expiration>,
    #[serde(default)]
    pub auth: Option<String>,
    #[serde(default)]
    pub user: Option<SessionUser>,
}

impl SessionData {
    /// Create an anonymous session
    pub fn new(session_id: impl Into<String>, country_code: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            country_code: country_code.into(),
            expires: None,
            auth: None,
            user: None,
        }
    }

    /// Attach an authenticated user to the session
    pub fn with_user(
        mut self,
        user_id: impl Into<String>,
        auth: impl Into<String>,
        expires: Expiration,
    ) -> Self {
        self.user = Some(SessionUser {
            user_id: user_id.into(),
        });
        self.auth = Some(auth.into());
        self.expires = Some(expires);
        self
    }
}

impl fmt::Debug for SessionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionData")
            .field("session_id", &self.session_id)
            .field("country_code", &self.country_code)
            .field("expires", &self.expires)
            .field("auth", &self.auth.as_ref().map(|_| "[REDACTED]"))
            .field("user", &self.user)
            .finish()
    }
}

/// Result of a credential login
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthGrant {
    pub auth: String,
    pub expires: Expiration,
    pub user: SessionUser,
}

impl fmt::Debug for AuthGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGrant")
            .field("auth", &"[REDACTED]")
            .field("expires", &self.expires)
            .field("user", &self.user)
            .finish()
    }
}

/// JSON envelope shared by the session and auth endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the payload, turning the error flag or a missing payload into
    /// an endpoint error
    pub fn into_data(self, endpoint: &str) -> crate::Result<T> {
        if self.error {
            let message = self
                .message
                .unwrap_or_else(|| "unspecified error".to_string());
            return Err(crate::Error::endpoint(endpoint, message.as_str()));
        }
        self.data
            .ok_or_else(|| crate::Error::endpoint(endpoint, "response carried no data"))
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}
