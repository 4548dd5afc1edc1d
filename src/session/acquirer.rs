//! Session acquisition with ordered fallback
//!
//! Servers are tried strictly one after the other in the order given. Any
//! failure against one server (transport, timeout, non-success status, error
//! flag, undecodable body, wrong region) moves on to the next one; the first
//! US session wins and later servers are never contacted. An error that
//! [`Error::allows_fallback`](crate::Error::allows_fallback) rejects ends the
//! search immediately.

use super::network::{NetworkManager, endpoint_label};
use crate::{
    Result,
    error::format_error_for_logging,
    types::{ServerDescriptor, SessionData},
    utils::generate_device_id,
};
use tracing::{debug, info, warn};
use url::Url;

/// Stored account state sent along with a start-session request
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AcquireContext {
    /// Auth token from the last authenticated session
    pub auth: Option<String>,
    /// User id from the last authenticated session
    pub user_id: Option<String>,
}

impl std::fmt::Debug for AcquireContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcquireContext")
            .field("auth", &self.auth.as_ref().map(|_| "[REDACTED]"))
            .field("user_id", &self.user_id)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SessionAcquirer {
    network: NetworkManager,
    required_country: String,
}

impl SessionAcquirer {
    pub fn new(network: NetworkManager, required_country: impl Into<String>) -> Self {
        Self {
            network,
            required_country: required_country.into(),
        }
    }

    /// Start-session URL for one server
    ///
    /// `auth` is sent whenever present. `user_id` only goes to servers that
    /// accept it and only together with `auth`. A fresh `device_id` is
    /// generated for servers that want one.
    pub fn request_url(&self, server: &ServerDescriptor, context: &AcquireContext) -> Result<Url> {
        let mut url = Url::parse(&server.url)?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(auth) = &context.auth {
                query.append_pair("auth", auth);
                if server.send_user_id
                    && let Some(user_id) = &context.user_id
                {
                    query.append_pair("user_id", user_id);
                }
            }
            if server.generate_device_id {
                query.append_pair("device_id", &generate_device_id());
            }
        }
        Ok(url)
    }

    /// Try `servers` in order until one hands out a session in the required
    /// country
    pub async fn acquire(
        &self,
        servers: &[ServerDescriptor],
        context: &AcquireContext,
    ) -> Result<SessionData> {
        for (index, server) in servers.iter().enumerate() {
            debug!(
                "Fetching server {} ({}/{})",
                server.url,
                index + 1,
                servers.len()
            );

            match self.fetch_session(server, context).await {
                Ok(session) => {
                    info!("Got a US session id from {}", server.url);
                    return Ok(session);
                }
                Err(e) if e.allows_fallback() => {
                    warn!(
                        error = %format_error_for_logging(&e),
                        "Session server {} failed, trying next", server.url
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(crate::Error::exhausted(servers.len()))
    }

    async fn fetch_session(
        &self,
        server: &ServerDescriptor,
        context: &AcquireContext,
    ) -> Result<SessionData> {
        let url = self.request_url(server, context)?;
        let label = endpoint_label(&url);

        let session = self
            .network
            .get_envelope::<SessionData>(url)
            .await?
            .into_data(&label)?;

        if session.country_code != self.required_country {
            return Err(crate::Error::wrong_region(&label, &session.country_code));
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn acquirer() -> SessionAcquirer {
        SessionAcquirer::new(NetworkManager::new(&Settings::default()).unwrap(), "US")
    }

    fn query(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn context(auth: Option<&str>, user_id: Option<&str>) -> AcquireContext {
        AcquireContext {
            auth: auth.map(str::to_string),
            user_id: user_id.map(str::to_string),
        }
    }

    #[test]
    fn test_anonymous_request_keeps_version() {
        let server = ServerDescriptor::new("https://a.example/start_session?version=1.1");
        let url = acquirer().request_url(&server, &context(None, None)).unwrap();
        assert_eq!(
            query(&url),
            vec![("version".to_string(), "1.1".to_string())]
        );
    }

    #[test]
    fn test_user_id_requires_auth() {
        let server = ServerDescriptor::new("https://a.example/s").with_user_id(true);

        let url = acquirer()
            .request_url(&server, &context(None, Some("42")))
            .unwrap();
        assert!(query(&url).is_empty());

        let url = acquirer()
            .request_url(&server, &context(Some("tok"), Some("42")))
            .unwrap();
        assert_eq!(
            query(&url),
            vec![
                ("auth".to_string(), "tok".to_string()),
                ("user_id".to_string(), "42".to_string())
            ]
        );
    }

    #[test]
    fn test_user_id_not_sent_to_servers_without_the_flag() {
        let server = ServerDescriptor::new("https://a.example/s");
        let url = acquirer()
            .request_url(&server, &context(Some("tok"), Some("42")))
            .unwrap();
        assert_eq!(query(&url), vec![("auth".to_string(), "tok".to_string())]);
    }

    #[test]
    fn test_device_id_is_fresh_per_request() {
        let server = ServerDescriptor::new("https://a.example/s").with_device_id(true);
        let acquirer = acquirer();
        let first = acquirer.request_url(&server, &context(None, None)).unwrap();
        let second = acquirer.request_url(&server, &context(None, None)).unwrap();

        let device = |url: &Url| {
            query(url)
                .into_iter()
                .find(|(k, _)| k == "device_id")
                .map(|(_, v)| v)
                .unwrap()
        };
        assert_eq!(device(&first).len(), 32);
        assert_ne!(device(&first), device(&second));
    }

    #[test]
    fn test_context_debug_redacts_auth() {
        let rendered = format!("{:?}", context(Some("secret-tok"), Some("42")));
        assert!(!rendered.contains("secret-tok"));
    }

    #[tokio::test]
    async fn test_empty_server_list_is_exhausted() {
        let err = acquirer()
            .acquire(&[], &AcquireContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Exhausted { attempts: 0 }));
    }
}
