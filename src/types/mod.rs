//! Type definitions for the unblocker
//!
//! This module contains the data exchanged with the backends and the records
//! kept in persistent storage.

pub mod credentials;
pub mod server;
pub mod session;
pub mod target;

pub use credentials::{EncryptedBlob, LoginRecord, Password, StoredLogin, StoredUser};
pub use server::{DEFAULT_SERVER_URL, ServerDescriptor};
pub use session::{ApiResponse, AuthGrant, Expiration, SessionData, SessionUser};
pub use target::SiteTarget;
