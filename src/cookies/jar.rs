//! Cookie jar backends

use super::{Cookie, CookieStore};
use crate::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

/// File name used inside a state directory
pub const JAR_FILE_NAME: &str = "cookies.json";

fn host_of(url: &str) -> Result<String> {
    let parsed = url::Url::parse(url)?;
    parsed
        .host_str()
        .map(str::to_string)
        .ok_or_else(|| crate::Error::validation("url", &format!("'{}' has no host", url)))
}

/// Most specific cookie named `name` for `host`
fn lookup(cookies: &[Cookie], host: &str, name: &str) -> Option<Cookie> {
    cookies
        .iter()
        .filter(|c| c.name == name && c.matches_host(host))
        .max_by_key(|c| c.domain.trim_start_matches('.').len())
        .cloned()
}

fn upsert(cookies: &mut Vec<Cookie>, cookie: Cookie) {
    match cookies
        .iter_mut()
        .find(|c| c.name == cookie.name && c.domain == cookie.domain)
    {
        Some(existing) => *existing = cookie,
        None => cookies.push(cookie),
    }
}

/// Process-local cookie jar
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: RwLock<Vec<Cookie>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cookies(cookies: Vec<Cookie>) -> Self {
        Self {
            cookies: RwLock::new(cookies),
        }
    }

    /// Every cookie in the jar, in insertion order
    pub async fn all(&self) -> Vec<Cookie> {
        self.cookies.read().await.clone()
    }
}

#[async_trait::async_trait]
impl CookieStore for MemoryCookieJar {
    async fn get(&self, url: &str, name: &str) -> Result<Option<Cookie>> {
        let host = host_of(url)?;
        Ok(lookup(&self.cookies.read().await, &host, name))
    }

    async fn set(&self, cookie: Cookie) -> Result<()> {
        upsert(&mut *self.cookies.write().await, cookie);
        Ok(())
    }
}

/// Cookie jar persisted as a JSON array
#[derive(Debug)]
pub struct FileCookieJar {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCookieJar {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(JAR_FILE_NAME))
    }

    /// Every cookie in the jar; a missing or unreadable file reads as empty
    pub async fn all(&self) -> Vec<Cookie> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to read cookie jar {:?}: {}", self.path, e);
                }
                return Vec::new();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("Error parsing cookie jar {:?}: {}", self.path, e);
            Vec::new()
        })
    }
}

#[async_trait::async_trait]
impl CookieStore for FileCookieJar {
    async fn get(&self, url: &str, name: &str) -> Result<Option<Cookie>> {
        let host = host_of(url)?;
        Ok(lookup(&self.all().await, &host, name))
    }

    async fn set(&self, cookie: Cookie) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut cookies = self.all().await;
        upsert(&mut cookies, cookie);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&cookies)?).await?;
        debug!("Cookie jar saved to: {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_set_overwrites_same_name_and_domain() {
        let jar = MemoryCookieJar::new();
        let url = "https://www.crunchyroll.com";
        jar.set(Cookie::new("session_id", "a", "www.crunchyroll.com", url))
            .await
            .unwrap();
        jar.set(Cookie::new("session_id", "b", "www.crunchyroll.com", url))
            .await
            .unwrap();

        assert_eq!(jar.all().await.len(), 1);
        assert_eq!(jar.get(url, "session_id").await.unwrap().unwrap().value, "b");
    }

    #[tokio::test]
    async fn test_get_prefers_most_specific_domain() {
        let jar = MemoryCookieJar::with_cookies(vec![
            Cookie::new("OptanonControl", "wide", ".crunchyroll.com", "https://crunchyroll.com"),
            Cookie::new(
                "OptanonControl",
                "narrow",
                "www.crunchyroll.com",
                "https://www.crunchyroll.com",
            ),
        ]);

        let found = jar
            .get("https://www.crunchyroll.com", "OptanonControl")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.value, "narrow");
    }

    #[tokio::test]
    async fn test_get_rejects_url_without_host() {
        let jar = MemoryCookieJar::new();
        assert!(jar.get("data:text/plain,hi", "session_id").await.is_err());
    }

    #[tokio::test]
    async fn test_file_jar_persists() {
        let dir = TempDir::new().unwrap();
        let url = "https://www.crunchyroll.com";
        FileCookieJar::in_dir(dir.path())
            .set(Cookie::new("c_locale", "enUS", "www.crunchyroll.com", url))
            .await
            .unwrap();

        let reopened = FileCookieJar::in_dir(dir.path());
        assert_eq!(
            reopened.get(url, "c_locale").await.unwrap().unwrap().value,
            "enUS"
        );
    }
}
