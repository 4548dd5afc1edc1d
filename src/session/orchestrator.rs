//! One localization cycle, end to end
//!
//! `gate -> shuffle -> acquire -> arm gate -> cookies -> login -> reload`
//!
//! The gate is armed after every acquisition attempt, successful or not,
//! cancelled or not, and never when the cycle was refused by the gate itself. The reload request is
//! the last step and only happens after all cookie writes went through.

use super::{
    acquirer::{AcquireContext, SessionAcquirer},
    login::{AuthClient, LoginCoordinator, LoginOutcome},
    network::NetworkManager,
    rate_gate::RateGate,
    selector::EndpointSelector,
};
use crate::{
    Result,
    config::Settings,
    cookies::{CookieStore, CookieSynchronizer, MemoryCookieJar, SyncReport},
    error::{EXHAUSTED_NOTICE, format_error, format_error_for_user},
    host::{CredentialCipher, Notifier, PageSignal, TracingNotifier, TracingSignal, UnavailableCipher},
    storage::{KeyValueStore, MemoryStore, StateStore},
    types::{LoginRecord, SiteTarget},
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of [`Unblocker::localize`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LocalizeOutcome {
    /// The previous cycle was too recent; nothing was done
    CoolingDown { remaining_secs: i64 },
    /// A US session was applied and the page asked to reload
    Localized {
        cookies: SyncReport,
        login: LoginOutcome,
    },
}

/// Local state summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnblockerStatus {
    /// Seconds until the next cycle may start, if the gate is closed
    pub cooldown_remaining_secs: Option<i64>,
    /// An auth token from an earlier session is stored
    pub has_login: bool,
    /// Stored user id, if any
    pub user_id: Option<String>,
    /// Credentials captured from the login form are stored
    pub has_credentials: bool,
}

/// Coordinates a localization cycle and the account messages
#[derive(Debug)]
pub struct Unblocker {
    settings: Arc<Settings>,
    state: StateStore,
    gate: RateGate,
    selector: EndpointSelector,
    acquirer: SessionAcquirer,
    cookies: CookieSynchronizer,
    login: LoginCoordinator,
    cipher: Arc<dyn CredentialCipher>,
    notifier: Arc<dyn Notifier>,
    page: Arc<dyn PageSignal>,
}

/// Builder for [`Unblocker`]
///
/// Unset capabilities default to in-memory storage, an in-memory cookie
/// jar, log-only notifications and reload requests, and no cipher.
#[derive(Debug)]
pub struct UnblockerBuilder {
    settings: Settings,
    storage: Arc<dyn KeyValueStore>,
    cookies: Arc<dyn CookieStore>,
    notifier: Arc<dyn Notifier>,
    page: Arc<dyn PageSignal>,
    cipher: Arc<dyn CredentialCipher>,
}

impl UnblockerBuilder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            storage: Arc::new(MemoryStore::new()),
            cookies: Arc::new(MemoryCookieJar::new()),
            notifier: Arc::new(TracingNotifier),
            page: Arc::new(TracingSignal),
            cipher: Arc::new(UnavailableCipher),
        }
    }

    pub fn storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.storage = storage;
        self
    }

    pub fn cookies(mut self, cookies: Arc<dyn CookieStore>) -> Self {
        self.cookies = cookies;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn page_signal(mut self, page: Arc<dyn PageSignal>) -> Self {
        self.page = page;
        self
    }

    pub fn cipher(mut self, cipher: Arc<dyn CredentialCipher>) -> Self {
        self.cipher = cipher;
        self
    }

    /// Validate the settings and wire the pipeline together
    pub fn build(self) -> Result<Unblocker> {
        self.settings.validate()?;

        let network = NetworkManager::new(&self.settings)?;
        let state = StateStore::new(self.storage);
        let unblock = &self.settings.unblock;

        let acquirer = SessionAcquirer::new(network.clone(), unblock.required_country.as_str());
        let cookies = CookieSynchronizer::new(
            self.cookies,
            self.settings.site.base_host.as_str(),
            unblock.locale.as_str(),
        );
        let login = LoginCoordinator::new(
            state.clone(),
            AuthClient::new(
                network,
                self.settings.site.auth_endpoint.as_str(),
                unblock.locale.as_str(),
            ),
            self.cipher.clone(),
            self.notifier.clone(),
            unblock.save_login,
        );

        Ok(Unblocker {
            gate: RateGate::new(state.clone()),
            selector: EndpointSelector::new(unblock.servers.clone()),
            acquirer,
            cookies,
            login,
            state,
            cipher: self.cipher,
            notifier: self.notifier,
            page: self.page,
            settings: Arc::new(self.settings),
        })
    }
}

impl Unblocker {
    pub fn builder(settings: Settings) -> UnblockerBuilder {
        UnblockerBuilder::new(settings)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run one localization cycle for `target`
    ///
    /// Returns an error when no server produced a US session (the user is
    /// notified) or when a cookie write failed (logged only). In both cases
    /// the page is not reloaded.
    pub async fn localize(&self, target: &SiteTarget) -> Result<LocalizeOutcome> {
        if let Some(remaining) = self.gate.remaining(Utc::now()).await? {
            info!(
                "Not fetching session id, last try less than {} seconds ago ({} seconds left)",
                self.settings.unblock.cooldown_secs,
                remaining.num_seconds()
            );
            return Ok(LocalizeOutcome::CoolingDown {
                remaining_secs: remaining.num_seconds(),
            });
        }

        info!("Fetching session id");
        let servers = self.selector.working_order();
        let context = self.acquire_context().await;
        let guard = self.gate.arm_on_drop(self.settings.unblock.cooldown_secs);
        let acquired = self.acquirer.acquire(&servers, &context).await;

        if let Err(e) = guard.arm().await {
            warn!("Could not arm rate gate: {}", format_error(&e));
        }

        let session = match acquired {
            Ok(session) => session,
            Err(e) => {
                warn!("{}", format_error(&e));
                self.notifier
                    .notify(format_error_for_user(&e).unwrap_or(EXHAUSTED_NOTICE));
                return Err(e);
            }
        };

        let cookies = self.cookies.apply(&session, target).await.inspect_err(|e| {
            warn!("Aborting cycle: {}", format_error(e));
        })?;
        let login = self.login.finalize(&session).await;

        self.page.request_reload();
        Ok(LocalizeOutcome::Localized { cookies, login })
    }

    /// Stored account state sent to the session servers
    ///
    /// The auth token is only reused when saving logins is enabled. Unreadable
    /// records are treated as absent.
    async fn acquire_context(&self) -> AcquireContext {
        let mut context = AcquireContext::default();

        if self.settings.unblock.save_login {
            match self.state.stored_login().await {
                Ok(login) => context.auth = login.map(|login| login.auth),
                Err(e) => warn!("Ignoring stored login: {}", format_error(&e)),
            }
        }

        match self.state.stored_user().await {
            Ok(user) => context.user_id = user.map(|user| user.user_id),
            Err(e) => warn!("Ignoring stored user: {}", format_error(&e)),
        }

        context
    }

    /// Open the rate gate so the next cycle runs immediately
    pub async fn reset_cooldown(&self) -> Result<()> {
        self.gate.reset().await
    }

    /// Forget the stored token, user and credentials
    pub async fn logout(&self) -> Result<()> {
        self.state.clear_account().await?;
        info!("Stored account removed");
        Ok(())
    }

    /// Store credentials captured from the login form
    ///
    /// The password is encrypted when the cipher allows it and stored in
    /// plaintext otherwise; plaintext records are deleted on their next use.
    pub async fn remember_login(&self, username: &str, password: &str) -> Result<()> {
        let record = match self.cipher.encrypt(username, password).await {
            Ok(blob) => LoginRecord::encrypted(username, blob),
            Err(e) => {
                debug!("Storing password unencrypted: {}", format_error(&e));
                LoginRecord::plaintext(username, password)
            }
        };
        self.state.save_login_record(&record).await?;
        info!("Credentials saved for {}", username);
        Ok(())
    }

    pub async fn status(&self) -> Result<UnblockerStatus> {
        let remaining = self.gate.remaining(Utc::now()).await?;
        Ok(UnblockerStatus {
            cooldown_remaining_secs: remaining.map(|r| r.num_seconds()),
            has_login: self.state.stored_login().await?.is_some(),
            user_id: self.state.stored_user().await?.map(|u| u.user_id),
            has_credentials: self.state.login_record().await?.is_some(),
        })
    }
}
