//! CR-Unblocker
//!
//! Gets a US session for a video streaming site that is geo-restricted
//! outside the US. A session id is fetched from a set of third-party session
//! servers, written into the site's cookies together with the consent
//! cookies' region, and the page is asked to reload. Optionally the user's
//! stored credentials are used to log the new session in.
//!
//! # Architecture
//!
//! - [`session`]: rate gate, server ordering and fallback, credential login,
//!   and the [`Unblocker`] that runs a full cycle
//! - [`cookies`]: cookie jar access and the consent cookie rewrites
//! - [`storage`]: the persisted records (auth token, user, credentials,
//!   cooldown)
//! - [`host`]: notifications, reload requests and credential encryption
//!   supplied by the embedding environment
//!
//! # Usage
//!
//! ```bash
//! cr-unblock localize --host www.crunchyroll.com
//! cr-unblock status
//! ```
//!
//! # Examples
//!
//! ```rust
//! use cr_unblocker::{Settings, Unblocker};
//!
//! # fn example() -> cr_unblocker::Result<()> {
//! let unblocker = Unblocker::builder(Settings::default()).build()?;
//! assert!(unblocker.settings_view().switch_region);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod cookies;
pub mod error;
pub mod host;
pub mod session;
pub mod storage;
pub mod types;
pub mod utils;

pub use config::{ConfigLoader, Settings};
pub use error::{Error, Result};
pub use session::{LocalizeOutcome, LoginOutcome, Message, Reply, Unblocker};
pub use types::{ServerDescriptor, SessionData, SiteTarget};
