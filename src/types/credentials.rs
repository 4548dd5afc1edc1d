//! Persisted credential and account records
//!
//! Field names follow the records the browser extension keeps in local
//! storage, so existing `loginData`, `login` and `user` entries load as is.

use super::session::Expiration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque output of the credential cipher
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptedBlob(pub serde_json::Value);

impl fmt::Debug for EncryptedBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptedBlob([REDACTED])")
    }
}

/// Stored password, either still in plaintext (legacy records, or the cipher
/// was unavailable when it was saved) or encrypted at rest
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Password {
    Plaintext(String),
    Encrypted(EncryptedBlob),
}

impl Password {
    pub fn is_plaintext(&self) -> bool {
        matches!(self, Password::Plaintext(_))
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Password::Plaintext(_) => f.write_str("Plaintext([REDACTED])"),
            Password::Encrypted(_) => f.write_str("Encrypted([REDACTED])"),
        }
    }
}

/// Credentials captured from the login form (`loginData`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRecord {
    pub username: String,
    pub password: Password,
}

impl LoginRecord {
    pub fn plaintext(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Password::Plaintext(password.into()),
        }
    }

    pub fn encrypted(username: impl Into<String>, blob: EncryptedBlob) -> Self {
        Self {
            username: username.into(),
            password: Password::Encrypted(blob),
        }
    }
}

/// Auth token from the last authenticated session (`login`)
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredLogin {
    pub auth: String,
    pub expiration: Expiration,
}

impl fmt::Debug for StoredLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredLogin")
            .field("auth", &"[REDACTED]")
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// User id of the last authenticated session (`user`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    pub user_id: String,
}
