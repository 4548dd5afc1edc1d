//! Applies an acquired session to the target site's cookies
//!
//! Four cookies are written strictly one after the other:
//!
//! 1. `session_id` gets the new session id
//! 2. `c_locale` is pinned to the configured locale
//! 3. `OptanonConsent` has the region in its `geolocation=<code>%3B` segment
//!    replaced by the session's country code
//! 4. `OptanonControl` has the region in its `ccc=<code>` segment replaced
//!
//! Both consent cookies are read before the first write, so a failing read
//! aborts the sequence before anything was changed. A consent cookie that is
//! missing, or whose value has no region segment, is left untouched and
//! reported as skipped.

use super::{Cookie, CookieStore};
use crate::{
    Result,
    types::{SessionData, SiteTarget},
};
use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, warn};

pub const SESSION_COOKIE: &str = "session_id";
pub const LOCALE_COOKIE: &str = "c_locale";
pub const CONSENT_COOKIE: &str = "OptanonConsent";
pub const CONTROL_COOKIE: &str = "OptanonControl";

static GEOLOCATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"((?:^|&)geolocation=)[a-zA-Z_-]{1,5}(%3[bB])")
        .expect("geolocation regex is valid") // Static pattern, safe to panic
});

static CCC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(ccc=)[a-zA-Z_-]{1,5}").expect("ccc regex is valid") // Static pattern, safe to panic
});

fn substitute(pattern: &Regex, value: &str, country_code: &str) -> Option<String> {
    if !pattern.is_match(value) {
        return None;
    }
    let rewritten = pattern.replace(value, |caps: &Captures| {
        format!(
            "{}{}{}",
            &caps[1],
            country_code,
            caps.get(2).map_or("", |m| m.as_str())
        )
    });
    Some(rewritten.into_owned())
}

/// Replace the region in an `OptanonConsent` value
///
/// Returns `None` when the value has no `geolocation=<code>%3B` segment.
pub fn rewrite_consent_geolocation(value: &str, country_code: &str) -> Option<String> {
    substitute(&GEOLOCATION_PATTERN, value, country_code)
}

/// Replace the region in an `OptanonControl` value
///
/// Returns `None` when the value has no `ccc=<code>` segment.
pub fn rewrite_control_country(value: &str, country_code: &str) -> Option<String> {
    substitute(&CCC_PATTERN, value, country_code)
}

/// What one synchronization pass did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Cookies written, in write order
    pub written: Vec<String>,
    /// Consent cookies left untouched
    pub skipped: Vec<String>,
}

/// Writes session cookies for a target site
#[derive(Debug, Clone)]
pub struct CookieSynchronizer {
    store: Arc<dyn CookieStore>,
    base_host: String,
    locale: String,
}

impl CookieSynchronizer {
    pub fn new(
        store: Arc<dyn CookieStore>,
        base_host: impl Into<String>,
        locale: impl Into<String>,
    ) -> Self {
        Self {
            store,
            base_host: base_host.into(),
            locale: locale.into(),
        }
    }

    /// Write the full cookie sequence for `session` on `target`
    ///
    /// Stops at the first failing write; earlier writes are not rolled back.
    pub async fn apply(&self, session: &SessionData, target: &SiteTarget) -> Result<SyncReport> {
        let url = target.origin(&self.base_host);
        let domain = target.domain(&self.base_host);
        let mut report = SyncReport::default();

        let consent = self
            .rewritten(&url, CONSENT_COOKIE, |value| {
                rewrite_consent_geolocation(value, &session.country_code)
            })
            .await?;
        let control = self
            .rewritten(&url, CONTROL_COOKIE, |value| {
                rewrite_control_country(value, &session.country_code)
            })
            .await?;

        let planned = [
            (SESSION_COOKIE, Some(session.session_id.clone())),
            (LOCALE_COOKIE, Some(self.locale.clone())),
            (CONSENT_COOKIE, consent),
            (CONTROL_COOKIE, control),
        ];

        for (name, value) in planned {
            let Some(value) = value else {
                report.skipped.push(name.to_string());
                continue;
            };

            self.store
                .set(Cookie::new(name, value, domain.as_str(), url.as_str()))
                .await
                .map_err(|e| crate::Error::cookie(name, &e.to_string()))?;
            debug!("Cookie {} written for {}", name, domain);
            report.written.push(name.to_string());
        }

        info!(
            "Cookies synchronized for {} ({} written, {} skipped)",
            domain,
            report.written.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Read a consent cookie and compute its rewritten value
    async fn rewritten<F>(&self, url: &str, name: &str, rewrite: F) -> Result<Option<String>>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let existing = self
            .store
            .get(url, name)
            .await
            .map_err(|e| crate::Error::cookie(name, &e.to_string()))?;

        let Some(cookie) = existing else {
            warn!("{} cookie not present, leaving it untouched", name);
            return Ok(None);
        };

        let rewritten = rewrite(&cookie.value);
        if rewritten.is_none() {
            warn!("{} cookie carries no region segment, leaving it untouched", name);
        }
        Ok(rewritten)
    }
}
