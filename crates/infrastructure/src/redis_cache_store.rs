//! Redis-backed cache store for the permission cache.

use async_trait::async_trait;
use gatehouse_application::CacheStore;
use gatehouse_core::{AppError, AppResult};
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;

/// Redis implementation of the cache store port.
///
/// Keys are written verbatim unless a namespace is configured, in which case
/// they become `<namespace>:<key>`.
#[derive(Clone)]
pub struct RedisCacheStore {
    client: redis::Client,
    key_prefix: String,
}

impl RedisCacheStore {
    /// Creates a cache store with a configured Redis client and key namespace.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, key: &str) -> String {
        if self.key_prefix.is_empty() {
            return key.to_owned();
        }

        format!("{}:{key}", self.key_prefix)
    }

    async fn connection(&self) -> AppResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| {
                tracing::warn!(error = %error, "permission cache redis connection failed");
                AppError::Internal(format!("failed to connect to redis: {error}"))
            })
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut connection = self.connection().await?;

        connection
            .get(self.key_for(key))
            .await
            .map_err(|error| AppError::Internal(format!("failed to read cache key '{key}': {error}")))
    }

    async fn set(&self, key: &str, value: &str, ttl_minutes: u32) -> AppResult<()> {
        if ttl_minutes == 0 {
            tracing::debug!(key, "skipping cache write with zero ttl");
            return Ok(());
        }

        let mut connection = self.connection().await?;

        connection
            .set_ex(self.key_for(key), value, u64::from(ttl_minutes) * 60)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to write cache key '{key}': {error}"))
            })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut connection = self.connection().await?;

        connection
            .del::<_, ()>(self.key_for(key))
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete cache key '{key}': {error}"))
            })
    }

    async fn has(&self, key: &str) -> AppResult<bool> {
        let mut connection = self.connection().await?;

        connection
            .exists(self.key_for(key))
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to check cache key '{key}': {error}"))
            })
    }

    async fn increment(&self, key: &str) -> AppResult<i64> {
        let mut connection = self.connection().await?;

        connection
            .incr(self.key_for(key), 1_i64)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to increment cache key '{key}': {error}"))
            })
    }
}
