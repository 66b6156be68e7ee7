use gatehouse_core::{AppError, AppResult, UserIdentity};
use gatehouse_domain::{AdminAbility, AuditAction, RoleId, UserId};

use crate::MutationOutcome;

use super::{SecurityAdminService, log_failed_mutation};

impl SecurityAdminService {
    /// Attaches a role to a user.
    pub async fn assign_role(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<MutationOutcome<()>> {
        self.require_ability(actor, AdminAbility::UserEdit).await?;
        self.require_assignable_role(role_id).await?;

        self.repository
            .assign_role_to_user(user_id, role_id)
            .await
            .inspect_err(|error| log_failed_mutation("assign_role", &user_id.to_string(), error))?;

        let cache = self
            .permission_cache
            .invalidate_after_write("assign_role", &user_id.to_string())
            .await;
        self.append_assignment_audit(actor, AuditAction::RoleAssigned, user_id, role_id)
            .await;

        Ok(MutationOutcome { value: (), cache })
    }

    /// Detaches a role from a user.
    pub async fn remove_role(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<MutationOutcome<()>> {
        self.require_ability(actor, AdminAbility::UserEdit).await?;
        self.require_assignable_role(role_id).await?;

        self.repository
            .remove_role_from_user(user_id, role_id)
            .await
            .inspect_err(|error| log_failed_mutation("remove_role", &user_id.to_string(), error))?;

        let cache = self
            .permission_cache
            .invalidate_after_write("remove_role", &user_id.to_string())
            .await;
        self.append_assignment_audit(actor, AuditAction::RoleUnassigned, user_id, role_id)
            .await;

        Ok(MutationOutcome { value: (), cache })
    }

    /// Replaces all of a user's roles with exactly one role.
    pub async fn change_role(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<MutationOutcome<()>> {
        self.require_ability(actor, AdminAbility::UserEdit).await?;
        self.require_assignable_role(role_id).await?;

        self.repository
            .replace_user_roles(user_id, role_id)
            .await
            .inspect_err(|error| log_failed_mutation("change_role", &user_id.to_string(), error))?;

        let cache = self
            .permission_cache
            .invalidate_after_write("change_role", &user_id.to_string())
            .await;
        self.append_assignment_audit(actor, AuditAction::RoleChanged, user_id, role_id)
            .await;

        Ok(MutationOutcome { value: (), cache })
    }

    async fn require_assignable_role(&self, role_id: RoleId) -> AppResult<()> {
        if self.repository.find_role(role_id).await?.is_none() {
            return Err(AppError::Validation(
                "the selected role does not exist".to_owned(),
            ));
        }

        Ok(())
    }

    async fn append_assignment_audit(
        &self,
        actor: &UserIdentity,
        action: AuditAction,
        user_id: UserId,
        role_id: RoleId,
    ) {
        self.append_audit(
            actor,
            action,
            "user",
            user_id.to_string(),
            Some(format!("role_id={role_id}")),
        )
        .await
    }
}
