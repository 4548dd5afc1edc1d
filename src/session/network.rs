//! HTTP client configuration and bounded requests
//!
//! Every request to a session or auth backend goes through [`NetworkManager`],
//! which applies the configured proxy, user agent and per-attempt timeout and
//! decodes the shared JSON envelope.

use crate::{Result, config::Settings, types::ApiResponse};
use reqwest::{Client, Method, Proxy};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Scheme, host and path of a URL
///
/// Request URLs carry auth tokens and passwords in their query, so only this
/// form may appear in logs and errors.
pub fn endpoint_label(url: &Url) -> String {
    let mut label = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());
    if let Some(port) = url.port() {
        label.push_str(&format!(":{}", port));
    }
    label.push_str(url.path());
    label
}

/// Network manager for backend requests
#[derive(Debug, Clone)]
pub struct NetworkManager {
    /// Base HTTP client
    client: Client,
    /// Upper bound for one request, connect to last body byte
    attempt_timeout: Duration,
}

impl NetworkManager {
    /// Create new network manager from the network settings
    pub fn new(settings: &Settings) -> Result<Self> {
        let network = &settings.network;
        let mut client_builder = Client::builder()
            .user_agent(network.user_agent.as_str())
            .connect_timeout(Duration::from_secs(network.connect_timeout));

        if let Some(proxy_url) = settings.get_proxy_url() {
            let proxy = Proxy::all(&proxy_url).map_err(|e| {
                crate::Error::config("proxy", &format!("Invalid proxy URL '{}': {}", proxy_url, e))
            })?;
            client_builder = client_builder.proxy(proxy);
        }

        let client = client_builder.build().map_err(|e| {
            crate::Error::network(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            attempt_timeout: Duration::from_secs(network.attempt_timeout),
        })
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// GET `url` and decode its envelope
    pub async fn get_envelope<T: DeserializeOwned>(&self, url: Url) -> Result<ApiResponse<T>> {
        self.fetch_envelope(Method::GET, url).await
    }

    /// POST to `url` with an empty body and decode its envelope
    pub async fn post_envelope<T: DeserializeOwned>(&self, url: Url) -> Result<ApiResponse<T>> {
        self.fetch_envelope(Method::POST, url).await
    }

    async fn fetch_envelope<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
    ) -> Result<ApiResponse<T>> {
        let label = endpoint_label(&url);
        debug!("{} {}", method, label);

        // reqwest errors print the full URL, query secrets included
        let request = async {
            let response = self
                .client
                .request(method, url)
                .send()
                .await
                .map_err(reqwest::Error::without_url)?;
            let status = response.status();
            if !status.is_success() {
                return Err(crate::Error::status(label.as_str(), status.as_u16()));
            }
            let body = response.bytes().await.map_err(reqwest::Error::without_url)?;
            Ok::<_, crate::Error>(serde_json::from_slice::<ApiResponse<T>>(&body)?)
        };

        match tokio::time::timeout(self.attempt_timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(crate::Error::timeout(
                label.as_str(),
                self.attempt_timeout.as_secs(),
            )),
        }
    }
}
