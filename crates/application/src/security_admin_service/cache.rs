use gatehouse_core::{AppResult, UserIdentity};
use gatehouse_domain::{AuditAction, RoleSnapshot, User};

use crate::{PermissionCacheMetrics, UserAuthorizationDebug};

use super::SecurityAdminService;

impl SecurityAdminService {
    /// Forces a full permission cache invalidation. Admin role only.
    pub async fn clear_permission_cache(&self, actor: &UserIdentity) -> AppResult<u64> {
        self.require_admin(actor).await?;

        let version = self.permission_cache.invalidate_all().await?;
        self.append_audit(
            actor,
            AuditAction::PermissionCacheCleared,
            "permission_cache",
            version.to_string(),
            None,
        )
        .await;

        Ok(version)
    }

    /// Invalidates and rebuilds the global role snapshot. Admin role only.
    pub async fn refresh_permission_cache(&self, actor: &UserIdentity) -> AppResult<RoleSnapshot> {
        self.require_admin(actor).await?;
        self.permission_cache.refresh_global_snapshot().await
    }

    /// Returns permission cache metrics. Admin role only.
    pub async fn permission_cache_metrics(
        &self,
        actor: &UserIdentity,
    ) -> AppResult<PermissionCacheMetrics> {
        self.require_admin(actor).await?;
        self.permission_cache.metrics().await
    }

    /// Returns how the cache resolves one user. Admin role only.
    pub async fn debug_user_authorization(
        &self,
        actor: &UserIdentity,
        user: &User,
    ) -> AppResult<UserAuthorizationDebug> {
        self.require_admin(actor).await?;
        self.permission_cache.debug_user(user).await
    }
}
