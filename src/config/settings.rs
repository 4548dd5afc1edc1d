//! Configuration settings
//!
//! Settings are loaded from a TOML file, then overridden by environment
//! variables and finally by command-line flags.

use crate::types::ServerDescriptor;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Seconds between two session acquisition cycles
pub const DEFAULT_COOLDOWN_SECS: u64 = 60;

// Helper functions for serde defaults
fn default_true() -> bool {
    true
}

fn default_servers() -> Vec<ServerDescriptor> {
    vec![ServerDescriptor::default()]
}

fn default_cooldown() -> u64 {
    DEFAULT_COOLDOWN_SECS
}

fn default_required_country() -> String {
    "US".to_string()
}

fn default_locale() -> String {
    "enUS".to_string()
}

fn default_base_host() -> String {
    "crunchyroll".to_string()
}

fn default_auth_endpoint() -> String {
    "https://api.crunchyroll.com/login.0.json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_attempt_timeout() -> u64 {
    15
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

/// Main configuration settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Session acquisition configuration
    #[serde(default)]
    pub unblock: UnblockSettings,
    /// Target site configuration
    #[serde(default)]
    pub site: SiteSettings,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Network configuration
    #[serde(default)]
    pub network: NetworkSettings,
    /// Local state configuration
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Session acquisition and login behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnblockSettings {
    /// Candidate session backends, shuffled before every cycle
    #[serde(default = "default_servers")]
    pub servers: Vec<ServerDescriptor>,
    /// Minimum seconds between two acquisition cycles
    #[serde(default = "default_cooldown")]
    pub cooldown_secs: u64,
    /// Reuse the stored auth token and log in with stored credentials
    #[serde(default)]
    pub save_login: bool,
    /// Acquire a session when the page is not in the required region
    #[serde(default = "default_true")]
    pub switch_region: bool,
    /// Country code a session must resolve to
    #[serde(default = "default_required_country")]
    pub required_country: String,
    /// Locale written to `c_locale` and sent on login
    #[serde(default = "default_locale")]
    pub locale: String,
}

/// Target site addressing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSettings {
    /// Host name between subdomain and extension
    #[serde(default = "default_base_host")]
    pub base_host: String,
    /// Credential login endpoint
    #[serde(default = "default_auth_endpoint")]
    pub auth_endpoint: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable verbose logging
    #[serde(default)]
    pub verbose: bool,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Network and proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// HTTPS proxy URL
    #[serde(default)]
    pub https_proxy: Option<String>,
    /// HTTP proxy URL
    #[serde(default)]
    pub http_proxy: Option<String>,
    /// All protocols proxy URL
    #[serde(default)]
    pub all_proxy: Option<String>,
    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    /// Upper bound in seconds for one request to one server
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout: u64,
    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Local state configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageSettings {
    /// Directory holding the key-value store and cookie jar
    #[serde(default)]
    pub state_dir: Option<PathBuf>,
}

impl Default for UnblockSettings {
    fn default() -> Self {
        Self {
            servers: default_servers(),
            cooldown_secs: default_cooldown(),
            save_login: false,
            switch_region: default_true(),
            required_country: default_required_country(),
            locale: default_locale(),
        }
    }
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            base_host: default_base_host(),
            auth_endpoint: default_auth_endpoint(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            verbose: false,
            format: default_log_format(),
        }
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            https_proxy: None,
            http_proxy: None,
            all_proxy: None,
            connect_timeout: default_connect_timeout(),
            attempt_timeout: default_attempt_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> crate::Result<Self> {
        Self::default().merge_with_env()
    }

    /// Load settings from configuration file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::config("file", &format!("Failed to read config file: {}", e))
        })?;

        let settings: Settings = toml::from_str(&content).map_err(|e| {
            crate::Error::config("file", &format!("Failed to parse config file: {}", e))
        })?;

        Ok(settings)
    }

    /// Override fields with every environment variable that is set
    ///
    /// A variable whose value equals the built-in default still wins over the
    /// value loaded from a file.
    pub fn merge_with_env(mut self) -> crate::Result<Self> {
        if let Ok(save_login) = std::env::var("UNBLOCKER_SAVE_LOGIN") {
            self.unblock.save_login = save_login.parse().map_err(|e| {
                crate::Error::config("UNBLOCKER_SAVE_LOGIN", &format!("Invalid flag: {}", e))
            })?;
        }

        if let Ok(cooldown) = std::env::var("UNBLOCKER_COOLDOWN_SECS") {
            self.unblock.cooldown_secs = cooldown.parse().map_err(|e| {
                crate::Error::config(
                    "UNBLOCKER_COOLDOWN_SECS",
                    &format!("Invalid cooldown: {}", e),
                )
            })?;
        }

        if let Ok(state_dir) = std::env::var("UNBLOCKER_STATE_DIR") {
            self.storage.state_dir = Some(PathBuf::from(state_dir));
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(verbose) = std::env::var("VERBOSE") {
            self.logging.verbose = verbose.parse().unwrap_or(false);
        }

        // Proxy variables only ever add a proxy
        if let Ok(proxy) = std::env::var("HTTPS_PROXY") {
            self.network.https_proxy = Some(proxy);
        }
        if let Ok(proxy) = std::env::var("HTTP_PROXY") {
            self.network.http_proxy = Some(proxy);
        }
        if let Ok(proxy) = std::env::var("ALL_PROXY") {
            self.network.all_proxy = Some(proxy);
        }

        Ok(self)
    }

    /// Get effective proxy URL based on priority
    pub fn get_proxy_url(&self) -> Option<String> {
        self.network
            .https_proxy
            .as_ref()
            .or(self.network.http_proxy.as_ref())
            .or(self.network.all_proxy.as_ref())
            .cloned()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> crate::Result<()> {
        if self.unblock.servers.is_empty() {
            return Err(crate::Error::config(
                "servers",
                "At least one session server is required",
            ));
        }

        for server in &self.unblock.servers {
            if let Err(e) = url::Url::parse(&server.url) {
                return Err(crate::Error::config(
                    "servers",
                    &format!("Invalid server URL '{}': {}", server.url, e),
                ));
            }
        }

        if let Err(e) = url::Url::parse(&self.site.auth_endpoint) {
            return Err(crate::Error::config(
                "auth_endpoint",
                &format!("Invalid auth endpoint '{}': {}", self.site.auth_endpoint, e),
            ));
        }

        if self.unblock.cooldown_secs == 0 {
            return Err(crate::Error::config(
                "cooldown_secs",
                "Invalid cooldown: cannot be 0",
            ));
        }

        if self.network.attempt_timeout == 0 {
            return Err(crate::Error::config(
                "attempt_timeout",
                "Invalid attempt timeout: cannot be 0",
            ));
        }

        if self.site.base_host.is_empty() {
            return Err(crate::Error::config("base_host", "Base host cannot be empty"));
        }

        if self.unblock.required_country.is_empty() {
            return Err(crate::Error::config(
                "required_country",
                "Required country cannot be empty",
            ));
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(crate::Error::config(
                    "log_level",
                    &format!("Invalid log level: {}", self.logging.level),
                ));
            }
        }

        for (name, proxy_url) in [
            ("https_proxy", &self.network.https_proxy),
            ("http_proxy", &self.network.http_proxy),
            ("all_proxy", &self.network.all_proxy),
        ]
        .iter()
        {
            if let Some(url_str) = proxy_url
                && let Err(e) = url::Url::parse(url_str)
            {
                return Err(crate::Error::config(
                    *name,
                    &format!("Invalid proxy URL '{}': {}", url_str, e),
                ));
            }
        }

        Ok(())
    }
}
