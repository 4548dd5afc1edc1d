//! File-backed storage integration tests
//!
//! State written by one unblocker must be visible to the next one started
//! on the same directory.

use cr_unblocker::{
    Settings, Unblocker,
    cookies::FileCookieJar,
    storage::{JsonFileStore, KeyValueStore},
};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

fn unblocker(dir: &TempDir) -> Unblocker {
    Unblocker::builder(Settings::default())
        .storage(Arc::new(JsonFileStore::in_dir(dir.path())))
        .cookies(Arc::new(FileCookieJar::in_dir(dir.path())))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_credentials_survive_restart() {
    let dir = TempDir::new().unwrap();

    unblocker(&dir).remember_login("ann", "pw").await.unwrap();

    let status = unblocker(&dir).status().await.unwrap();
    assert!(status.has_credentials);

    let store = JsonFileStore::in_dir(dir.path());
    assert_eq!(
        store.get("loginData").await.unwrap(),
        Some(json!({ "username": "ann", "password": "pw" }))
    );
}

#[tokio::test]
async fn test_logout_keeps_cooldown_record() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::in_dir(dir.path());
    store
        .set_many(vec![
            ("login".to_string(), json!({ "auth": "a", "expiration": 1 })),
            ("user".to_string(), json!({ "userId": "1" })),
            ("last_unblock".to_string(), json!(4_102_444_800_000_i64)),
        ])
        .await
        .unwrap();

    unblocker(&dir).logout().await.unwrap();

    assert_eq!(store.get("login").await.unwrap(), None);
    assert_eq!(store.get("user").await.unwrap(), None);
    assert!(store.get("last_unblock").await.unwrap().is_some());
    assert!(
        unblocker(&dir)
            .status()
            .await
            .unwrap()
            .cooldown_remaining_secs
            .is_some()
    );
}
