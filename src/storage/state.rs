//! Typed access to the records kept in a [`KeyValueStore`]

use super::KeyValueStore;
use crate::{
    Result,
    types::{LoginRecord, StoredLogin, StoredUser},
};
use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::sync::Arc;

/// Auth token of the last authenticated session
pub const LOGIN_KEY: &str = "login";
/// User id of the last authenticated session
pub const USER_KEY: &str = "user";
/// Credentials captured from the login form
pub const LOGIN_DATA_KEY: &str = "loginData";
/// Earliest time of the next acquisition cycle, in unix milliseconds
pub const LAST_UNBLOCK_KEY: &str = "last_unblock";

/// Typed view over the unblocker's records
#[derive(Debug, Clone)]
pub struct StateStore {
    store: Arc<dyn KeyValueStore>,
}

impl StateStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.store.get(key).await? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value).map(Some).map_err(|e| {
                crate::Error::storage("decode", &format!("Record '{}' is malformed: {}", key, e))
            }),
        }
    }

    fn entry<T: Serialize>(key: &str, value: &T) -> Result<(String, Value)> {
        Ok((key.to_string(), serde_json::to_value(value)?))
    }

    pub async fn stored_login(&self) -> Result<Option<StoredLogin>> {
        self.read(LOGIN_KEY).await
    }

    pub async fn stored_user(&self) -> Result<Option<StoredUser>> {
        self.read(USER_KEY).await
    }

    pub async fn login_record(&self) -> Result<Option<LoginRecord>> {
        self.read(LOGIN_DATA_KEY).await
    }

    pub async fn save_login_record(&self, record: &LoginRecord) -> Result<()> {
        self.store
            .set_many(vec![Self::entry(LOGIN_DATA_KEY, record)?])
            .await
    }

    pub async fn remove_login_record(&self) -> Result<()> {
        self.store.remove(&[LOGIN_DATA_KEY]).await
    }

    /// Replace the stored auth token, leaving the user record alone
    pub async fn save_login(&self, login: &StoredLogin) -> Result<()> {
        self.store
            .set_many(vec![Self::entry(LOGIN_KEY, login)?])
            .await
    }

    /// Replace both the auth token and the user record
    pub async fn save_authenticated(&self, login: &StoredLogin, user: &StoredUser) -> Result<()> {
        self.store
            .set_many(vec![Self::entry(LOGIN_KEY, login)?, Self::entry(USER_KEY, user)?])
            .await
    }

    /// Forget everything tied to the account
    pub async fn clear_account(&self) -> Result<()> {
        self.store
            .remove(&[LOGIN_KEY, USER_KEY, LOGIN_DATA_KEY])
            .await
    }

    pub async fn next_unblock(&self) -> Result<Option<DateTime<Utc>>> {
        let millis: Option<i64> = self.read(LAST_UNBLOCK_KEY).await?;
        Ok(millis.and_then(DateTime::from_timestamp_millis))
    }

    pub async fn set_next_unblock(&self, at: DateTime<Utc>) -> Result<()> {
        self.store
            .set_many(vec![(
                LAST_UNBLOCK_KEY.to_string(),
                Value::from(at.timestamp_millis()),
            )])
            .await
    }

    pub async fn clear_next_unblock(&self) -> Result<()> {
        self.store.remove(&[LAST_UNBLOCK_KEY]).await
    }
}
