use gatehouse_core::{AppResult, UserIdentity};
use gatehouse_domain::{AdminAbility, AuditAction, Permission, PermissionId};

use crate::{MutationOutcome, SavePermissionInput};

use super::{SecurityAdminService, log_failed_mutation};

impl SecurityAdminService {
    /// Lists all permissions.
    pub async fn list_permissions(&self, actor: &UserIdentity) -> AppResult<Vec<Permission>> {
        self.require_ability(actor, AdminAbility::PermissionView)
            .await?;
        self.repository.list_permissions().await
    }

    /// Creates a permission and bumps the cache generation.
    pub async fn create_permission(
        &self,
        actor: &UserIdentity,
        input: SavePermissionInput,
    ) -> AppResult<MutationOutcome<Permission>> {
        self.require_ability(actor, AdminAbility::PermissionCreate)
            .await?;

        let permission_name = input.name.as_str().to_owned();
        let permission = self
            .repository
            .create_permission(input)
            .await
            .inspect_err(|error| log_failed_mutation("create_permission", &permission_name, error))?;

        let cache = self
            .permission_cache
            .invalidate_after_write("create_permission", &permission.id().to_string())
            .await;
        self.append_audit(
            actor,
            AuditAction::PermissionCreated,
            "permission",
            permission.id().to_string(),
            Some(permission_name),
        )
        .await;

        Ok(MutationOutcome {
            value: permission,
            cache,
        })
    }

    /// Updates a permission and bumps the cache generation.
    pub async fn update_permission(
        &self,
        actor: &UserIdentity,
        permission_id: PermissionId,
        input: SavePermissionInput,
    ) -> AppResult<MutationOutcome<Permission>> {
        self.require_ability(actor, AdminAbility::PermissionEdit)
            .await?;

        let permission = self
            .repository
            .update_permission(permission_id, input)
            .await
            .inspect_err(|error| {
                log_failed_mutation("update_permission", &permission_id.to_string(), error)
            })?;

        let cache = self
            .permission_cache
            .invalidate_after_write("update_permission", &permission_id.to_string())
            .await;
        self.append_audit(
            actor,
            AuditAction::PermissionUpdated,
            "permission",
            permission_id.to_string(),
            Some(permission.name().as_str().to_owned()),
        )
        .await;

        Ok(MutationOutcome {
            value: permission,
            cache,
        })
    }

    /// Deletes a permission and bumps the cache generation.
    pub async fn delete_permission(
        &self,
        actor: &UserIdentity,
        permission_id: PermissionId,
    ) -> AppResult<MutationOutcome<()>> {
        self.require_ability(actor, AdminAbility::PermissionDelete)
            .await?;

        self.repository
            .delete_permission(permission_id)
            .await
            .inspect_err(|error| {
                log_failed_mutation("delete_permission", &permission_id.to_string(), error)
            })?;

        let cache = self
            .permission_cache
            .invalidate_after_write("delete_permission", &permission_id.to_string())
            .await;
        self.append_audit(
            actor,
            AuditAction::PermissionDeleted,
            "permission",
            permission_id.to_string(),
            None,
        )
        .await;

        Ok(MutationOutcome { value: (), cache })
    }
}
