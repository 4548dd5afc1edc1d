//! Backend server descriptors

use serde::{Deserialize, Serialize};

/// Session endpoint the unblocker ships with
pub const DEFAULT_SERVER_URL: &str = "https://cr-unblocker.us.to/start_session?version=1.1";

/// One candidate session backend and the optional parameters it accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerDescriptor {
    /// Versioned start-session URL
    pub url: String,
    /// Attach the stored user id when an auth token is also sent
    #[serde(default)]
    pub send_user_id: bool,
    /// Attach a freshly generated device id
    #[serde(default)]
    pub generate_device_id: bool,
}

impl ServerDescriptor {
    /// Create a descriptor that sends no optional parameters
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            send_user_id: false,
            generate_device_id: false,
        }
    }

    /// Set whether the stored user id is attached
    pub fn with_user_id(mut self, send: bool) -> Self {
        self.send_user_id = send;
        self
    }

    /// Set whether a device id is generated for each request
    pub fn with_device_id(mut self, generate: bool) -> Self {
        self.generate_device_id = generate;
        self
    }
}

impl Default for ServerDescriptor {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_URL).with_user_id(true)
    }
}
