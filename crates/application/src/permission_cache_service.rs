//! Versioned permission cache.
//!
//! Derived authorization data lives in the cache store under two kinds of
//! keys: one global role snapshot and one resolution per user and cache
//! generation. Writers never enumerate per-user keys. They bump the
//! generation counter instead, which makes every older user key unreachable,
//! and delete the global snapshot so it is rebuilt from storage.
//!
//! Cache store failures on the read path are treated as misses: the data is
//! recomputed from storage and the failure is logged.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use gatehouse_core::AppResult;
use gatehouse_domain::{RoleSnapshot, UserId, UserResolution};

use crate::{AuthorizationRepository, CacheStore, GLOBAL_ROLES_PERMISSIONS_KEY, user_cache_key};

mod generation;
mod maintenance;


pub use generation::CacheGeneration;
pub use maintenance::{PermissionCacheMetrics, UserAuthorizationDebug};

/// Default time-to-live for cached authorization data: one day.
pub const DEFAULT_CACHE_TTL_MINUTES: u32 = 1440;

/// Outcome of invalidating the permission cache after a committed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CacheInvalidation {
    /// The generation counter moved to `version`.
    Bumped {
        /// New cache generation.
        version: u64,
    },
    /// The counter could not be bumped; other processes may serve stale data
    /// until the cached entries expire.
    Failed,
}

/// Read-through cache for role snapshots and user resolutions.
#[derive(Clone)]
pub struct PermissionCacheService {
    store: Arc<dyn CacheStore>,
    repository: Arc<dyn AuthorizationRepository>,
    generation: CacheGeneration,
    ttl_minutes: u32,
}

impl PermissionCacheService {
    /// Creates a permission cache over a store and a storage repository.
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>, repository: Arc<dyn AuthorizationRepository>) -> Self {
        Self {
            generation: CacheGeneration::new(store.clone()),
            store,
            repository,
            ttl_minutes: DEFAULT_CACHE_TTL_MINUTES,
        }
    }

    /// Overrides the time-to-live of cached entries.
    #[must_use]
    pub fn with_ttl_minutes(mut self, ttl_minutes: u32) -> Self {
        self.ttl_minutes = ttl_minutes.max(1);
        self
    }

    /// Returns the generation counter shared with this cache.
    #[must_use]
    pub fn generation(&self) -> &CacheGeneration {
        &self.generation
    }

    /// Returns the global role snapshot, rebuilding it from storage on miss.
    pub async fn global_snapshot(&self) -> AppResult<RoleSnapshot> {
        if let Some(snapshot) = self
            .read_cached::<RoleSnapshot>(GLOBAL_ROLES_PERMISSIONS_KEY)
            .await
        {
            return Ok(snapshot);
        }

        let snapshot = self.load_global_snapshot().await?;
        self.write_cached(GLOBAL_ROLES_PERMISSIONS_KEY, &snapshot)
            .await;

        Ok(snapshot)
    }

    /// Returns the user's role and permissions for the current generation.
    ///
    /// When the generation cannot be read the resolution is computed from
    /// storage, reported with version 0 and not cached.
    pub async fn user_resolution(&self, user_id: UserId) -> AppResult<UserResolution> {
        let version = match self.generation.current().await {
            Ok(version) => version,
            Err(error) => {
                warn!(
                    error = %error,
                    user_id = %user_id,
                    "permission cache generation unavailable, resolving from storage"
                );
                return self.compute_resolution(user_id, 0).await;
            }
        };

        let cache_key = user_cache_key(user_id, version);
        if let Some(resolution) = self.read_cached::<UserResolution>(&cache_key).await {
            return Ok(resolution);
        }

        let resolution = self.compute_resolution(user_id, version).await?;
        self.write_cached(&cache_key, &resolution).await;

        Ok(resolution)
    }

    /// Bumps the generation and drops the global snapshot.
    ///
    /// Every per-user entry written under an older generation becomes
    /// unreachable.
    pub async fn bump_version(&self) -> AppResult<u64> {
        let version = self.generation.bump().await?;
        self.store.delete(GLOBAL_ROLES_PERMISSIONS_KEY).await?;
        Ok(version)
    }

    /// Invalidates cached data after a committed write to roles, permissions
    /// or role assignments.
    ///
    /// The bump is retried once. A second failure is logged and reported in
    /// the outcome without failing the already committed write.
    pub async fn invalidate_after_write(
        &self,
        operation: &str,
        target_id: &str,
    ) -> CacheInvalidation {
        match self.bump_version().await {
            Ok(version) => return CacheInvalidation::Bumped { version },
            Err(error) => warn!(
                error = %error,
                operation,
                target_id,
                "permission cache version bump failed, retrying"
            ),
        }

        match self.bump_version().await {
            Ok(version) => CacheInvalidation::Bumped { version },
            Err(error) => {
                warn!(
                    error = %error,
                    operation,
                    target_id,
                    "permission cache version bump failed, cached authorization may be stale"
                );
                CacheInvalidation::Failed
            }
        }
    }

    /// Drops the global snapshot first, then bumps the generation.
    ///
    /// Used after writes that change which roles exist or which permissions
    /// they hold.
    pub async fn invalidate_global_after_write(
        &self,
        operation: &str,
        target_id: &str,
    ) -> CacheInvalidation {
        if let Err(error) = self.store.delete(GLOBAL_ROLES_PERMISSIONS_KEY).await {
            warn!(
                error = %error,
                operation,
                target_id,
                "failed to delete global role snapshot"
            );
        }

        self.invalidate_after_write(operation, target_id).await
    }

    async fn compute_resolution(&self, user_id: UserId, version: u64) -> AppResult<UserResolution> {
        let role = self.repository.find_primary_role_name(user_id).await?;
        let snapshot = self.global_snapshot().await?;

        Ok(UserResolution::resolve(
            role,
            &snapshot,
            chrono::Utc::now().timestamp(),
            version,
        ))
    }

    async fn load_global_snapshot(&self) -> AppResult<RoleSnapshot> {
        let rows = self.repository.list_role_grant_rows().await?;

        Ok(RoleSnapshot::from_rows(rows.into_iter().map(|row| {
            (row.role_id, row.role_name, row.permission_name)
        })))
    }

    async fn read_cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key).await {
            Ok(raw) => raw?,
            Err(error) => {
                warn!(error = %error, key, "permission cache read failed");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(error = %error, key, "ignoring malformed permission cache entry");
                None
            }
        }
    }

    async fn write_cached<T: Serialize>(&self, key: &str, value: &T) {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(error = %error, key, "failed to serialize permission cache entry");
                return;
            }
        };

        if let Err(error) = self.store.set(key, &payload, self.ttl_minutes).await {
            warn!(error = %error, key, "permission cache write failed");
        }
    }
}
