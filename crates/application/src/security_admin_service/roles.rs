use std::collections::{BTreeMap, BTreeSet};

use gatehouse_core::{AppError, AppResult, UserIdentity};
use gatehouse_domain::{AdminAbility, AuditAction, PermissionId, Role, RoleId};

use crate::{
    MutationOutcome, PermissionModuleGroup, PermissionSyncOutcome, PermissionToggle,
    RolePermissionEditor, SaveRoleInput,
};

use super::{SecurityAdminService, log_failed_mutation};

impl SecurityAdminService {
    /// Lists all roles.
    pub async fn list_roles(&self, actor: &UserIdentity) -> AppResult<Vec<Role>> {
        self.require_ability(actor, AdminAbility::RoleView).await?;
        self.repository.list_roles().await
    }

    /// Creates a role and drops the global role snapshot.
    pub async fn create_role(
        &self,
        actor: &UserIdentity,
        input: SaveRoleInput,
    ) -> AppResult<MutationOutcome<Role>> {
        self.require_ability(actor, AdminAbility::RoleCreate).await?;

        let role_name = input.name.as_str().to_owned();
        let role = self
            .repository
            .create_role(input)
            .await
            .inspect_err(|error| log_failed_mutation("create_role", &role_name, error))?;

        let cache = self
            .permission_cache
            .invalidate_global_after_write("create_role", &role.id().to_string())
            .await;
        self.append_audit(
            actor,
            AuditAction::RoleCreated,
            "role",
            role.id().to_string(),
            Some(role_name),
        )
        .await;

        Ok(MutationOutcome { value: role, cache })
    }

    /// Updates a role and drops the global role snapshot.
    pub async fn update_role(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
        input: SaveRoleInput,
    ) -> AppResult<MutationOutcome<Role>> {
        self.require_ability(actor, AdminAbility::RoleEdit).await?;

        let role = self
            .repository
            .update_role(role_id, input)
            .await
            .inspect_err(|error| log_failed_mutation("update_role", &role_id.to_string(), error))?;

        let cache = self
            .permission_cache
            .invalidate_global_after_write("update_role", &role_id.to_string())
            .await;
        self.append_audit(
            actor,
            AuditAction::RoleUpdated,
            "role",
            role_id.to_string(),
            Some(role.name().as_str().to_owned()),
        )
        .await;

        Ok(MutationOutcome { value: role, cache })
    }

    /// Deletes a role and drops the global role snapshot.
    pub async fn delete_role(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
    ) -> AppResult<MutationOutcome<()>> {
        self.require_ability(actor, AdminAbility::RoleDelete).await?;

        self.repository
            .delete_role(role_id)
            .await
            .inspect_err(|error| log_failed_mutation("delete_role", &role_id.to_string(), error))?;

        let cache = self
            .permission_cache
            .invalidate_global_after_write("delete_role", &role_id.to_string())
            .await;
        self.append_audit(
            actor,
            AuditAction::RoleDeleted,
            "role",
            role_id.to_string(),
            None,
        )
        .await;

        Ok(MutationOutcome { value: (), cache })
    }

    /// Returns the role together with all permissions grouped by module.
    pub async fn role_permission_editor(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
    ) -> AppResult<RolePermissionEditor> {
        self.require_admin(actor).await?;

        let role = self.existing_role(role_id).await?;
        let granted: BTreeSet<PermissionId> = self
            .repository
            .list_role_permission_ids(role_id)
            .await?
            .into_iter()
            .collect();

        let mut modules: BTreeMap<String, Vec<PermissionToggle>> = BTreeMap::new();
        for permission in self.repository.list_permissions().await? {
            let is_granted = granted.contains(&permission.id());
            modules
                .entry(permission.module().to_owned())
                .or_default()
                .push(PermissionToggle {
                    permission,
                    granted: is_granted,
                });
        }

        let modules = modules
            .into_iter()
            .map(|(module, mut permissions)| {
                permissions.sort_by(|left, right| left.permission.name().cmp(right.permission.name()));
                PermissionModuleGroup {
                    module,
                    permissions,
                }
            })
            .collect();

        Ok(RolePermissionEditor { role, modules })
    }

    /// Replaces a role's permission set and invalidates every cached
    /// resolution.
    ///
    /// Unknown permission ids are rejected before anything is written.
    pub async fn sync_role_permissions(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
        permission_ids: Vec<PermissionId>,
    ) -> AppResult<MutationOutcome<PermissionSyncOutcome>> {
        self.require_ability(actor, AdminAbility::RoleEdit).await?;
        self.existing_role(role_id).await?;

        let requested: BTreeSet<PermissionId> = permission_ids.into_iter().collect();
        let known: BTreeSet<PermissionId> = self
            .repository
            .list_permissions()
            .await?
            .iter()
            .map(|permission| permission.id())
            .collect();
        if let Some(unknown) = requested.difference(&known).next() {
            return Err(AppError::Validation(format!(
                "permission '{unknown}' does not exist"
            )));
        }

        let requested: Vec<PermissionId> = requested.into_iter().collect();
        let outcome = self
            .repository
            .sync_role_permissions(role_id, &requested)
            .await
            .inspect_err(|error| {
                log_failed_mutation("sync_role_permissions", &role_id.to_string(), error)
            })?;

        let cache = self
            .permission_cache
            .invalidate_global_after_write("sync_role_permissions", &role_id.to_string())
            .await;
        self.append_audit(
            actor,
            AuditAction::RolePermissionsSynced,
            "role",
            role_id.to_string(),
            Some(format!(
                "attached={} detached={}",
                outcome.attached.len(),
                outcome.detached.len()
            )),
        )
        .await;

        Ok(MutationOutcome {
            value: outcome,
            cache,
        })
    }
}
