//! Browser cookie jar access
//!
//! The jar is an external service with no multi-cookie transactions: cookies
//! are read by name for a URL and written one at a time.

pub mod jar;
pub mod synchronizer;

pub use jar::{FileCookieJar, MemoryCookieJar};
pub use synchronizer::{
    CONSENT_COOKIE, CONTROL_COOKIE, CookieSynchronizer, LOCALE_COOKIE, SESSION_COOKIE, SyncReport,
    rewrite_consent_geolocation, rewrite_control_country,
};

use crate::Result;
use serde::{Deserialize, Serialize};

/// One cookie as stored in the jar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Domain the cookie is scoped to; a leading dot also covers subdomains
    pub domain: String,
    /// URL the cookie was written for
    pub url: String,
}

impl Cookie {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            url: url.into(),
        }
    }

    /// Whether this cookie is sent to `host`
    pub fn matches_host(&self, host: &str) -> bool {
        let domain = self.domain.trim_start_matches('.');
        host == domain || host.ends_with(&format!(".{}", domain))
    }
}

/// Asynchronous cookie jar
#[async_trait::async_trait]
pub trait CookieStore: Send + Sync + std::fmt::Debug {
    /// Read the cookie named `name` that would be sent to `url`
    async fn get(&self, url: &str, name: &str) -> Result<Option<Cookie>>;

    /// Create or overwrite a cookie
    async fn set(&self, cookie: Cookie) -> Result<()>;
}
