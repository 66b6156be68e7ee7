//! Role, permission and role assignment administration.
//!
//! Every write commits in storage first and then invalidates the permission
//! cache. Failed writes leave the cache generation untouched.

use std::sync::Arc;

use tracing::warn;

use gatehouse_core::{AppError, AppResult, UserIdentity};
use gatehouse_domain::{AdminAbility, AuditAction, Role, RoleId, RoleSpec};

use crate::{
    AuditEvent, AuditRepository, AuthorizationService, PermissionCacheService, RoleRepository,
};

mod assignments;
mod cache;
mod permissions;
mod roles;

#[cfg(test)]
mod tests;

const ADMIN_ROLE: &str = "admin";

/// Application service for RBAC administration.
#[derive(Clone)]
pub struct SecurityAdminService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn RoleRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    permission_cache: PermissionCacheService,
}

impl SecurityAdminService {
    /// Creates a new security admin service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn RoleRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        let permission_cache = authorization_service.permission_cache().clone();
        Self {
            authorization_service,
            repository,
            audit_repository,
            permission_cache,
        }
    }

    async fn require_ability(&self, actor: &UserIdentity, ability: AdminAbility) -> AppResult<()> {
        self.authorization_service
            .authorize(actor, ability.as_str())
            .await
    }

    async fn require_admin(&self, actor: &UserIdentity) -> AppResult<()> {
        self.authorization_service
            .require_role(actor, &RoleSpec::parse(ADMIN_ROLE))
            .await
    }

    async fn existing_role(&self, role_id: RoleId) -> AppResult<Role> {
        self.repository
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }

    async fn append_audit(
        &self,
        actor: &UserIdentity,
        action: AuditAction,
        resource_type: &str,
        resource_id: String,
        detail: Option<String>,
    ) {
        let result = self
            .audit_repository
            .append_event(AuditEvent {
                subject: actor.user_id().to_string(),
                action,
                resource_type: resource_type.to_owned(),
                resource_id: resource_id.clone(),
                detail,
            })
            .await;

        if let Err(error) = result {
            log_failed_audit(action, &resource_id, &error);
        }
    }
}

/// The mutation is already committed when the audit write runs, so a failed
/// audit entry is logged instead of failing the request.
pub(crate) fn log_failed_audit(action: AuditAction, target_id: &str, error: &AppError) {
    warn!(
        error = %error,
        operation = action.as_str(),
        target_id,
        "audit entry for committed mutation was not written"
    );
}

fn log_failed_mutation(operation: &str, target_id: &str, error: &AppError) {
    warn!(error = %error, operation, target_id, "authorization mutation failed");
}
