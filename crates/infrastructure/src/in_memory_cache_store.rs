use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use gatehouse_application::CacheStore;
use gatehouse_core::{AppError, AppResult};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|expires_at| expires_at > now)
    }
}

/// Process-local cache store adapter.
///
/// Suitable for single-process deployments and tests. Counters created by
/// `increment` never expire. Writes sweep expired entries, so per-user keys
/// orphaned by a version bump are dropped once their TTL has passed.
#[derive(Default)]
pub struct InMemoryCacheStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCacheStore {
    /// Creates an empty in-memory cache store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|entry| !entry.is_live(now)) {
            entries.remove(key);
        }

        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl_minutes: u32) -> AppResult<()> {
        if ttl_minutes == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let expires_at = now
            .checked_add(Duration::from_secs(u64::from(ttl_minutes) * 60))
            .unwrap_or(now);

        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(
            key.to_owned(),
            CacheEntry {
                value: value.to_owned(),
                expires_at: Some(expires_at),
            },
        );

        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn has(&self, key: &str) -> AppResult<bool> {
        let now = Instant::now();
        Ok(self
            .entries
            .read()
            .await
            .get(key)
            .is_some_and(|entry| entry.is_live(now)))
    }

    async fn increment(&self, key: &str) -> AppResult<i64> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.is_live(now));

        let (current, expires_at) = match entries.get(key) {
            Some(entry) if entry.is_live(now) => {
                let current = entry.value.trim().parse::<i64>().map_err(|error| {
                    AppError::Internal(format!(
                        "cache key '{key}' does not hold an integer: {error}"
                    ))
                })?;
                (current, entry.expires_at)
            }
            _ => (0, None),
        };

        let next = current.checked_add(1).ok_or_else(|| {
            AppError::Internal(format!("cache counter '{key}' overflowed"))
        })?;
        entries.insert(
            key.to_owned(),
            CacheEntry {
                value: next.to_string(),
                expires_at,
            },
        );

        Ok(next)
    }
}
