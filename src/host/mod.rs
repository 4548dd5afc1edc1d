//! Capabilities supplied by the hosting environment
//!
//! The unblocker never talks to the page or the user directly. It hands plain
//! text notifications to a [`Notifier`], asks a [`PageSignal`] to reload the
//! page that triggered the run, and delegates password encryption to a
//! [`CredentialCipher`]. Notifications and reload requests are fire-and-forget.

pub mod console;

pub use console::{ConsoleNotifier, ConsoleSignal};

use crate::{Result, types::EncryptedBlob};

/// User-visible notifications
pub trait Notifier: Send + Sync + std::fmt::Debug {
    fn notify(&self, message: &str);
}

/// Reload request sent back to the originating page
pub trait PageSignal: Send + Sync + std::fmt::Debug {
    fn request_reload(&self);
}

/// Encryption of stored passwords
#[async_trait::async_trait]
pub trait CredentialCipher: Send + Sync + std::fmt::Debug {
    async fn encrypt(&self, username: &str, password: &str) -> Result<EncryptedBlob>;

    async fn decrypt(&self, username: &str, blob: &EncryptedBlob) -> Result<String>;
}

/// Notifier that only writes to the diagnostics log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        tracing::warn!(target: "cr_unblocker::notification", "{}", message);
    }
}

/// Page signal for hosts without a page to reload
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSignal;

impl PageSignal for TracingSignal {
    fn request_reload(&self) {
        tracing::info!("Page reload requested");
    }
}

/// Cipher for hosts without a key store
///
/// Encryption fails, so captured passwords fall back to plaintext records,
/// and encrypted records cannot be used for a login.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableCipher;

#[async_trait::async_trait]
impl CredentialCipher for UnavailableCipher {
    async fn encrypt(&self, _username: &str, _password: &str) -> Result<EncryptedBlob> {
        Err(crate::Error::decrypt("no credential cipher is available"))
    }

    async fn decrypt(&self, _username: &str, _blob: &EncryptedBlob) -> Result<String> {
        Err(crate::Error::decrypt("no credential cipher is available"))
    }
}
