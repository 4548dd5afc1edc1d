//! Post-session account handling
//!
//! After a session was acquired the account state is reconciled:
//!
//! | session user | save login | stored credentials | action                        |
//! |--------------|------------|--------------------|-------------------------------|
//! | absent       | on         | present            | credential login              |
//! | present      | on         | any                | persist the renewed auth token|
//! | any          | off        | any                | nothing                       |
//!
//! Plaintext credentials are deleted before they are used, so a failed login
//! never leaves them behind. Encrypted credentials are decrypted once and kept.

use super::network::{NetworkManager, endpoint_label};
use crate::{
    Result,
    error::{LOGIN_FAILED_NOTICE, format_error},
    host::{CredentialCipher, Notifier},
    storage::StateStore,
    types::{AuthGrant, LoginRecord, Password, SessionData, StoredLogin, StoredUser},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

/// What [`LoginCoordinator::finalize`] did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoginOutcome {
    /// Nothing to do for this session
    NotRequired,
    /// The session was already authenticated; its token was persisted
    SessionRenewed,
    /// Stored credentials were used to log in
    LoggedIn { user_id: String },
    /// Credential login failed and the user was notified
    Failed,
}

/// Client for the credential login endpoint
#[derive(Debug, Clone)]
pub struct AuthClient {
    network: NetworkManager,
    endpoint: String,
    locale: String,
}

impl AuthClient {
    pub fn new(
        network: NetworkManager,
        endpoint: impl Into<String>,
        locale: impl Into<String>,
    ) -> Self {
        Self {
            network,
            endpoint: endpoint.into(),
            locale: locale.into(),
        }
    }

    /// Bind `session_id` to the account
    pub async fn login(&self, session_id: &str, account: &str, password: &str) -> Result<AuthGrant> {
        let mut url = Url::parse(&self.endpoint)?;
        url.query_pairs_mut()
            .append_pair("session_id", session_id)
            .append_pair("locale", &self.locale)
            .append_pair("account", account)
            .append_pair("password", password);
        let label = endpoint_label(&url);

        self.network
            .post_envelope::<AuthGrant>(url)
            .await
            .and_then(|response| response.into_data(&label))
            .map_err(|e| crate::Error::login(format_error(&e)))
    }
}

#[derive(Debug, Clone)]
pub struct LoginCoordinator {
    state: StateStore,
    auth: AuthClient,
    cipher: Arc<dyn CredentialCipher>,
    notifier: Arc<dyn Notifier>,
    save_login: bool,
}

impl LoginCoordinator {
    pub fn new(
        state: StateStore,
        auth: AuthClient,
        cipher: Arc<dyn CredentialCipher>,
        notifier: Arc<dyn Notifier>,
        save_login: bool,
    ) -> Self {
        Self {
            state,
            auth,
            cipher,
            notifier,
            save_login,
        }
    }

    /// Reconcile stored account state with a freshly acquired session
    ///
    /// Failures are logged and, for a rejected login, surfaced through the
    /// notifier; they never fail the cycle.
    pub async fn finalize(&self, session: &SessionData) -> LoginOutcome {
        if !self.save_login {
            return LoginOutcome::NotRequired;
        }

        if session.user.is_some() {
            return self.persist_session_login(session).await;
        }

        let record = match self.state.login_record().await {
            Ok(record) => record,
            Err(e) => {
                warn!("Could not read stored credentials: {}", format_error(&e));
                None
            }
        };

        match record {
            Some(record) => self.login_with_record(session, record).await,
            None => LoginOutcome::NotRequired,
        }
    }

    async fn persist_session_login(&self, session: &SessionData) -> LoginOutcome {
        let (Some(auth), Some(expires)) = (&session.auth, &session.expires) else {
            warn!("Authenticated session carried no auth token, not saving login");
            return LoginOutcome::NotRequired;
        };

        let login = StoredLogin {
            auth: auth.clone(),
            expiration: expires.clone(),
        };
        if let Err(e) = self.state.save_login(&login).await {
            warn!("Could not save auth token: {}", format_error(&e));
        }
        LoginOutcome::SessionRenewed
    }

    async fn login_with_record(&self, session: &SessionData, record: LoginRecord) -> LoginOutcome {
        info!("Logging in using stored credentials");

        if record.password.is_plaintext()
            && let Err(e) = self.state.remove_login_record().await
        {
            warn!("Could not remove plaintext credentials: {}", format_error(&e));
        }

        let grant = match self.login_user(&session.session_id, record).await {
            Ok(grant) => grant,
            Err(e) => {
                warn!("Credential login failed: {}", format_error(&e));
                self.notifier.notify(LOGIN_FAILED_NOTICE);
                return LoginOutcome::Failed;
            }
        };

        let login = StoredLogin {
            auth: grant.auth,
            expiration: grant.expires,
        };
        let user = StoredUser {
            user_id: grant.user.user_id,
        };
        if let Err(e) = self.state.save_authenticated(&login, &user).await {
            warn!("Could not save login: {}", format_error(&e));
        }

        info!("Logged in as user {}", user.user_id);
        LoginOutcome::LoggedIn {
            user_id: user.user_id,
        }
    }

    async fn login_user(&self, session_id: &str, record: LoginRecord) -> Result<AuthGrant> {
        let password = match record.password {
            Password::Plaintext(password) => password,
            Password::Encrypted(blob) => self.cipher.decrypt(&record.username, &blob).await?,
        };
        self.auth.login(session_id, &record.username, &password).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Settings,
        host::{TracingNotifier, UnavailableCipher},
        storage::MemoryStore,
        types::{EncryptedBlob, Expiration},
    };
    use serde_json::json;

    fn coordinator(state: StateStore, save_login: bool) -> LoginCoordinator {
        let network = NetworkManager::new(&Settings::default()).unwrap();
        LoginCoordinator::new(
            state,
            AuthClient::new(network, "http://127.0.0.1:9/login.0.json", "enUS"),
            Arc::new(UnavailableCipher),
            Arc::new(TracingNotifier),
            save_login,
        )
    }

    fn state() -> StateStore {
        StateStore::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_nothing_happens_without_save_login() {
        let state = state();
        state
            .save_login_record(&LoginRecord::plaintext("ann", "pw"))
            .await
            .unwrap();

        let outcome = coordinator(state.clone(), false)
            .finalize(&SessionData::new("s", "US"))
            .await;

        assert_eq!(outcome, LoginOutcome::NotRequired);
        assert!(state.login_record().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_authenticated_session_token_is_persisted() {
        let state = state();
        let session =
            SessionData::new("s", "US").with_user("42", "tok", Expiration::Timestamp(1_700_000_000));

        let outcome = coordinator(state.clone(), true).finalize(&session).await;

        assert_eq!(outcome, LoginOutcome::SessionRenewed);
        let login = state.stored_login().await.unwrap().unwrap();
        assert_eq!(login.auth, "tok");
        assert!(state.stored_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_no_credentials_means_no_login() {
        let outcome = coordinator(state(), true)
            .finalize(&SessionData::new("s", "US"))
            .await;
        assert_eq!(outcome, LoginOutcome::NotRequired);
    }

    #[tokio::test]
    async fn test_undecryptable_credentials_fail_and_are_kept() {
        let state = state();
        let record = LoginRecord::encrypted("ann", EncryptedBlob(json!({ "iv": "00" })));
        state.save_login_record(&record).await.unwrap();

        let outcome = coordinator(state.clone(), true)
            .finalize(&SessionData::new("s", "US"))
            .await;

        assert_eq!(outcome, LoginOutcome::Failed);
        assert_eq!(state.login_record().await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_failed_login_error_keeps_password_out() {
        let network = NetworkManager::new(&Settings::default()).unwrap();
        let auth = AuthClient::new(network, "http://127.0.0.1:9/login.0.json", "enUS");

        let err = auth.login("sid", "ann", "hunter2-SECRET").await.unwrap_err();

        let rendered = format_error(&err);
        assert!(matches!(err, crate::Error::Login { .. }));
        assert!(!rendered.contains("hunter2-SECRET"), "{}", rendered);
        assert!(!rendered.contains("password="), "{}", rendered);
    }

    #[test]
    fn test_outcome_serialization() {
        assert_eq!(
            serde_json::to_value(LoginOutcome::LoggedIn {
                user_id: "42".to_string()
            })
            .unwrap(),
            json!({ "status": "logged_in", "user_id": "42" })
        );
    }
}
