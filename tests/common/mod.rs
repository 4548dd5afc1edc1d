//! Common test utilities and helpers
//!
//! This module provides shared fakes and mock servers for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use cr_unblocker::{
    Result, Settings, Unblocker,
    cookies::{Cookie, CookieStore, MemoryCookieJar},
    host::{CredentialCipher, Notifier, PageSignal},
    storage::MemoryStore,
    types::{EncryptedBlob, ServerDescriptor},
};
use serde_json::json;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub const SITE_URL: &str = "https://www.crunchyroll.com";

pub const CONSENT_VALUE: &str =
    "isIABGlobal=false&datestamp=Mon+Jan+01&geolocation=DE%3BBE&AwaitingReconsent=false";

/// Notifier that records every message
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// Page signal that counts reload requests
#[derive(Debug, Default)]
pub struct RecordingSignal {
    reloads: AtomicUsize,
}

impl RecordingSignal {
    pub fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }
}

impl PageSignal for RecordingSignal {
    fn request_reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }
}

/// Cipher that wraps the password in a JSON object
#[derive(Debug, Default)]
pub struct FakeCipher {
    decrypts: AtomicUsize,
}

impl FakeCipher {
    pub fn decrypts(&self) -> usize {
        self.decrypts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialCipher for FakeCipher {
    async fn encrypt(&self, _username: &str, password: &str) -> Result<EncryptedBlob> {
        Ok(EncryptedBlob(json!({ "sealed": password })))
    }

    async fn decrypt(&self, _username: &str, blob: &EncryptedBlob) -> Result<String> {
        self.decrypts.fetch_add(1, Ordering::SeqCst);
        blob.0["sealed"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| cr_unblocker::Error::decrypt("blob is not sealed"))
    }
}

/// Cookie operations a [`FaultyJar`] rejects, by cookie name
#[derive(Debug, Default, Clone)]
pub struct CookieFaults {
    pub fail_get: Option<&'static str>,
    pub fail_set: Option<&'static str>,
}

/// Cookie jar that rejects reads or writes of chosen cookies
#[derive(Debug)]
pub struct FaultyJar {
    inner: Arc<MemoryCookieJar>,
    faults: CookieFaults,
}

#[async_trait]
impl CookieStore for FaultyJar {
    async fn get(&self, url: &str, name: &str) -> Result<Option<Cookie>> {
        if self.faults.fail_get.is_some_and(|n| n == name) {
            return Err(cr_unblocker::Error::storage("cookie read", "jar is locked"));
        }
        self.inner.get(url, name).await
    }

    async fn set(&self, cookie: Cookie) -> Result<()> {
        if self.faults.fail_set.is_some_and(|n| n == cookie.name) {
            return Err(cr_unblocker::Error::storage("cookie write", "jar is locked"));
        }
        self.inner.set(cookie).await
    }
}

/// Test configuration factory
pub struct TestConfig;

impl TestConfig {
    /// Settings whose auth endpoint points at `server`
    pub fn against(server: &MockServer, servers: Vec<ServerDescriptor>) -> Settings {
        let mut settings = Settings::default();
        settings.unblock.servers = servers;
        settings.site.auth_endpoint = format!("{}/login.0.json", server.uri());
        settings.network.connect_timeout = 2;
        settings.network.attempt_timeout = 2;
        settings.logging.level = "debug".to_string();
        settings
    }
}

/// Session server descriptor for a path on `server`
pub fn server_at(server: &MockServer, route: &str) -> ServerDescriptor {
    ServerDescriptor::new(format!("{}{}?version=1.1", server.uri(), route))
}

/// Mock server factory
pub struct MockServerFactory;

impl MockServerFactory {
    pub fn session_body(session_id: &str, country_code: &str) -> serde_json::Value {
        json!({
            "error": false,
            "data": { "session_id": session_id, "country_code": country_code }
        })
    }

    /// Answer `route` with a session, expecting exactly `calls` requests
    pub async fn session(
        server: &MockServer,
        route: &str,
        session_id: &str,
        country_code: &str,
        calls: u64,
    ) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(Self::session_body(session_id, country_code)),
            )
            .expect(calls)
            .mount(server)
            .await;
    }

    /// Answer `route` with `status`, expecting exactly `calls` requests
    pub async fn failing(server: &MockServer, route: &str, status: u16, calls: u64) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string("unavailable"))
            .expect(calls)
            .mount(server)
            .await;
    }

    /// Accept a credential login for user `user_id`
    pub async fn login_ok(server: &MockServer, user_id: &str, calls: u64) {
        Mock::given(method("POST"))
            .and(path("/login.0.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": false,
                "data": {
                    "auth": "fresh-auth",
                    "expires": "2030-01-01T00:00:00-08:00",
                    "user": { "user_id": user_id }
                }
            })))
            .expect(calls)
            .mount(server)
            .await;
    }

    /// Reject credential logins
    pub async fn login_rejected(server: &MockServer, calls: u64) {
        Mock::given(method("POST"))
            .and(path("/login.0.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": true,
                "message": "Incorrect login information.",
                "code": "bad_auth_params"
            })))
            .expect(calls)
            .mount(server)
            .await;
    }
}

/// An unblocker with recording capabilities and in-memory state
pub struct Harness {
    pub unblocker: Unblocker,
    pub storage: Arc<MemoryStore>,
    pub jar: Arc<MemoryCookieJar>,
    pub notifier: Arc<RecordingNotifier>,
    pub signal: Arc<RecordingSignal>,
    pub cipher: Arc<FakeCipher>,
}

impl Harness {
    pub fn new(settings: Settings) -> Self {
        Self::with_storage(settings, MemoryStore::new())
    }

    pub fn with_storage(settings: Settings, storage: MemoryStore) -> Self {
        Self::with_cookie_faults(settings, storage, CookieFaults::default())
    }

    /// Harness whose cookie jar rejects the operations in `faults`
    pub fn with_cookie_faults(
        settings: Settings,
        storage: MemoryStore,
        faults: CookieFaults,
    ) -> Self {
        let storage = Arc::new(storage);
        let jar = Arc::new(MemoryCookieJar::with_cookies(vec![
            Cookie::new("OptanonConsent", CONSENT_VALUE, ".crunchyroll.com", SITE_URL),
            Cookie::new("OptanonControl", "ccc=DE&otvers=6", ".crunchyroll.com", SITE_URL),
        ]));
        let notifier = Arc::new(RecordingNotifier::default());
        let signal = Arc::new(RecordingSignal::default());
        let cipher = Arc::new(FakeCipher::default());

        let unblocker = Unblocker::builder(settings)
            .storage(storage.clone())
            .cookies(Arc::new(FaultyJar {
                inner: jar.clone(),
                faults,
            }))
            .notifier(notifier.clone())
            .page_signal(signal.clone())
            .cipher(cipher.clone())
            .build()
            .unwrap();

        Self {
            unblocker,
            storage,
            jar,
            notifier,
            signal,
            cipher,
        }
    }

    /// Value of the cookie `name` written for the target domain
    pub async fn written_cookie(&self, name: &str) -> Option<String> {
        self.jar
            .all()
            .await
            .into_iter()
            .find(|c| c.name == name && c.domain == "www.crunchyroll.com")
            .map(|c| c.value)
    }
}

/// Test utilities
pub struct TestUtils;

impl TestUtils {
    /// Initialize test logging
    pub fn init_logger() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("debug")
            .try_init();
    }
}
