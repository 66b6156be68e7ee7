use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use gatehouse_core::{AppError, AppResult, UserIdentity};
use gatehouse_domain::{RoleSpec, UserId, UserResolution};

use crate::PermissionCacheService;


/// Authorization rule consulted after the permission gate falls through.
#[async_trait]
pub trait AccessPolicy: Send + Sync {
    /// Returns whether the policy grants the ability to the actor.
    async fn allows(&self, actor: &UserIdentity, ability: &str) -> AppResult<bool>;
}

/// Role and permission checks over the versioned permission cache.
#[derive(Clone)]
pub struct AuthorizationService {
    permission_cache: PermissionCacheService,
    policies: Vec<Arc<dyn AccessPolicy>>,
}

impl AuthorizationService {
    /// Creates an authorization service reading through the permission cache.
    #[must_use]
    pub fn new(permission_cache: PermissionCacheService) -> Self {
        Self {
            permission_cache,
            policies: Vec::new(),
        }
    }

    /// Registers a policy consulted by [`Self::authorize`] when the gate does
    /// not grant access.
    #[must_use]
    pub fn with_policy(mut self, policy: Arc<dyn AccessPolicy>) -> Self {
        self.policies.push(policy);
        self
    }

    /// Returns the permission cache used for resolution.
    #[must_use]
    pub fn permission_cache(&self) -> &PermissionCacheService {
        &self.permission_cache
    }

    /// Resolves the user's role and permissions.
    pub async fn resolve(&self, user_id: UserId) -> AppResult<UserResolution> {
        self.permission_cache.user_resolution(user_id).await
    }

    /// Returns whether the user's role matches any entry of `roles`.
    ///
    /// Users hold a single role, so this is the same check as
    /// [`Self::has_any_role`].
    pub async fn has_role(&self, user_id: UserId, roles: &RoleSpec) -> AppResult<bool> {
        self.has_any_role(user_id, roles).await
    }

    /// Returns whether the user's role matches any entry of `roles`,
    /// ignoring case and surrounding whitespace or quotes.
    pub async fn has_any_role(&self, user_id: UserId, roles: &RoleSpec) -> AppResult<bool> {
        Ok(self.resolve(user_id).await?.has_any_role(roles))
    }

    /// Returns whether the user holds the exact permission name.
    pub async fn has_permission(&self, user_id: UserId, permission: &str) -> AppResult<bool> {
        Ok(self.resolve(user_id).await?.has_permission(permission))
    }

    /// Returns whether the user holds any of the permission names.
    pub async fn has_any_permission(
        &self,
        user_id: UserId,
        permissions: &[String],
    ) -> AppResult<bool> {
        Ok(self.resolve(user_id).await?.has_any_permission(permissions))
    }

    /// Role check for guards and templates. Failures deny.
    pub async fn check_role(&self, user_id: UserId, roles: &RoleSpec) -> bool {
        self.has_any_role(user_id, roles)
            .await
            .unwrap_or_else(|error| deny_on_error(user_id, "check_role", &error))
    }

    /// Permission check for guards and templates. Failures deny.
    pub async fn check_permission(&self, user_id: UserId, permission: &str) -> bool {
        self.has_permission(user_id, permission)
            .await
            .unwrap_or_else(|error| deny_on_error(user_id, "check_permission", &error))
    }

    /// Any-permission check for guards and templates. Failures deny.
    pub async fn check_any_permission(&self, user_id: UserId, permissions: &[String]) -> bool {
        self.has_any_permission(user_id, permissions)
            .await
            .unwrap_or_else(|error| deny_on_error(user_id, "check_any_permission", &error))
    }

    /// Global gate run before any other authorization rule.
    ///
    /// Grants when the user holds a permission named like the ability and
    /// otherwise returns `None` so later rules decide.
    pub async fn before(&self, user_id: UserId, ability: &str) -> Option<bool> {
        self.check_permission(user_id, ability).await.then_some(true)
    }

    /// Ensures the actor may perform the ability.
    pub async fn authorize(&self, actor: &UserIdentity, ability: &str) -> AppResult<()> {
        if self.before(UserId::from(actor), ability).await == Some(true) {
            return Ok(());
        }

        for policy in &self.policies {
            if policy.allows(actor, ability).await? {
                return Ok(());
            }
        }

        Err(AppError::Forbidden(format!(
            "user '{}' is not allowed to perform '{ability}'",
            actor.user_id()
        )))
    }

    /// Ensures the actor holds one of the roles.
    ///
    /// The error does not say whether the roles exist.
    pub async fn require_role(&self, actor: &UserIdentity, roles: &RoleSpec) -> AppResult<()> {
        if self.check_role(UserId::from(actor), roles).await {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{}' does not hold a required role",
            actor.user_id()
        )))
    }
}

fn deny_on_error(user_id: UserId, check: &str, error: &AppError) -> bool {
    warn!(error = %error, user_id = %user_id, check, "authorization check failed, denying");
    false
}
