//! Session acquisition and the localization cycle
//!
//! This module handles the rate gate, server ordering and fallback, the
//! credential login that follows a session, and the orchestration of a full
//! cycle including the message protocol.

pub mod acquirer;
pub mod login;
pub mod messages;
pub mod network;
pub mod orchestrator;
pub mod rate_gate;
pub mod selector;

pub use acquirer::{AcquireContext, SessionAcquirer};
pub use login::{AuthClient, LoginCoordinator, LoginOutcome};
pub use messages::{Message, Reply, SettingsView};
pub use network::NetworkManager;
pub use orchestrator::{LocalizeOutcome, Unblocker, UnblockerBuilder, UnblockerStatus};
pub use rate_gate::{ArmGuard, RateGate};
pub use selector::EndpointSelector;
