//! Persistent key-value storage
//!
//! The unblocker keeps a handful of named JSON records between runs: the
//! captured credentials (`loginData`), the auth token of the last
//! authenticated session (`login`), its user id (`user`) and the rate gate
//! timestamp (`last_unblock`). Backends only need to provide the small
//! [`KeyValueStore`] contract; [`StateStore`] layers typed access on top.

pub mod file;
pub mod memory;
pub mod state;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use state::StateStore;

use crate::Result;
use serde_json::Value;

/// Asynchronous key-value storage over JSON values
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Read one record, `None` when absent
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write several records in one call
    async fn set_many(&self, entries: Vec<(String, Value)>) -> Result<()>;

    /// Remove records; absent keys are ignored
    async fn remove(&self, keys: &[&str]) -> Result<()>;
}
