//! Messages accepted from the page and settings UI
//!
//! Messages are JSON objects tagged by their `action` field, e.g.
//! `{"action":"localizeToUs","subdomain":"www.","extension":".com"}`.

use super::orchestrator::{LocalizeOutcome, Unblocker};
use crate::{Result, types::SiteTarget};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Message {
    /// The page is not in the required region
    LocalizeToUs {
        #[serde(default)]
        subdomain: String,
        extension: String,
        #[serde(default, rename = "loggedIn")]
        logged_in: bool,
    },
    /// Open the rate gate
    ResetLastUnblock,
    GetSettings,
    /// Credentials captured from the login form
    RememberLogin { username: String, password: String },
    Logout,
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::LocalizeToUs {
                subdomain,
                extension,
                logged_in,
            } => f
                .debug_struct("LocalizeToUs")
                .field("subdomain", subdomain)
                .field("extension", extension)
                .field("logged_in", logged_in)
                .finish(),
            Message::ResetLastUnblock => f.write_str("ResetLastUnblock"),
            Message::GetSettings => f.write_str("GetSettings"),
            Message::RememberLogin { username, .. } => f
                .debug_struct("RememberLogin")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Message::Logout => f.write_str("Logout"),
        }
    }
}

/// Flags exposed to the settings UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub save_login: bool,
    pub switch_region: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum Reply {
    /// The message was handled and has nothing to report
    Done,
    /// Region switching is turned off
    Disabled,
    Settings(SettingsView),
    Localize(LocalizeOutcome),
}

impl Unblocker {
    pub fn settings_view(&self) -> SettingsView {
        SettingsView {
            save_login: self.settings().unblock.save_login,
            switch_region: self.settings().unblock.switch_region,
        }
    }

    /// Handle one message
    pub async fn dispatch(&self, message: Message) -> Result<Reply> {
        debug!("Dispatching {:?}", message);

        match message {
            Message::LocalizeToUs {
                subdomain,
                extension,
                ..
            } => {
                if !self.settings().unblock.switch_region {
                    debug!("Region switching disabled, ignoring localize request");
                    return Ok(Reply::Disabled);
                }
                let outcome = self
                    .localize(&SiteTarget::new(subdomain, extension))
                    .await?;
                Ok(Reply::Localize(outcome))
            }
            Message::ResetLastUnblock => {
                self.reset_cooldown().await?;
                Ok(Reply::Done)
            }
            Message::GetSettings => Ok(Reply::Settings(self.settings_view())),
            Message::RememberLogin { username, password } => {
                self.remember_login(&username, &password).await?;
                Ok(Reply::Done)
            }
            Message::Logout => {
                self.logout().await?;
                Ok(Reply::Done)
            }
        }
    }
}
