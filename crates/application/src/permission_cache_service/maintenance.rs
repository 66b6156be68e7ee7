use std::collections::BTreeSet;

use serde::Serialize;
use tracing::info;

use gatehouse_core::AppResult;
use gatehouse_domain::{RoleSnapshot, User, UserId};

use crate::GLOBAL_ROLES_PERMISSIONS_KEY;

use super::PermissionCacheService;

/// Snapshot of permission cache state for operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionCacheMetrics {
    /// Current cache generation.
    pub permissions_version: u64,
    /// Whether the global role snapshot is currently cached.
    pub global_roles_cached: bool,
    /// Role names in the cached snapshot, empty when not cached.
    pub cached_roles: Vec<String>,
    /// Time the metrics were collected, RFC3339.
    pub last_updated: String,
    /// Time-to-live applied to cache entries.
    pub cache_ttl_minutes: u32,
}

/// Authorization state of one user as the cache resolves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserAuthorizationDebug {
    /// User identifier.
    pub user_id: UserId,
    /// User display name.
    pub name: String,
    /// Resolved role.
    pub role: Option<String>,
    /// Resolved permissions.
    pub permissions: BTreeSet<String>,
    /// Unix timestamp of the resolution.
    pub cached_at: i64,
    /// Generation of the resolution.
    pub version: u64,
    /// Whether the global role snapshot is currently cached.
    pub global_roles_cached: bool,
}

impl PermissionCacheService {
    /// Drops the global snapshot and bumps the generation, invalidating every
    /// cached resolution.
    pub async fn invalidate_all(&self) -> AppResult<u64> {
        self.store.delete(GLOBAL_ROLES_PERMISSIONS_KEY).await?;
        let version = self.bump_version().await?;

        info!(permissions_version = version, "all permission caches cleared");
        Ok(version)
    }

    /// Invalidates everything, then rebuilds and returns the global snapshot.
    pub async fn refresh_global_snapshot(&self) -> AppResult<RoleSnapshot> {
        self.invalidate_all().await?;
        self.global_snapshot().await
    }

    /// Collects cache metrics.
    pub async fn metrics(&self) -> AppResult<PermissionCacheMetrics> {
        let permissions_version = self.generation.current().await?;
        let global_roles_cached = self.store.has(GLOBAL_ROLES_PERMISSIONS_KEY).await?;
        let cached_roles = if global_roles_cached {
            self.global_snapshot().await?.role_names()
        } else {
            Vec::new()
        };

        Ok(PermissionCacheMetrics {
            permissions_version,
            global_roles_cached,
            cached_roles,
            last_updated: chrono::Utc::now().to_rfc3339(),
            cache_ttl_minutes: self.ttl_minutes,
        })
    }

    /// Resolves a user and reports the result together with cache state.
    pub async fn debug_user(&self, user: &User) -> AppResult<UserAuthorizationDebug> {
        let resolution = self.user_resolution(user.id()).await?;
        let global_roles_cached = self.store.has(GLOBAL_ROLES_PERMISSIONS_KEY).await?;

        Ok(UserAuthorizationDebug {
            user_id: user.id(),
            name: user.name().to_owned(),
            role: resolution.role,
            permissions: resolution.permissions,
            cached_at: resolution.cached_at,
            version: resolution.version,
            global_roles_cached,
        })
    }
}
