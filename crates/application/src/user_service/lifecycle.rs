use tracing::info;

use gatehouse_core::{AppError, NonEmptyString, UserIdentity};
use gatehouse_domain::{AdminAbility, AuditAction, validate_password};

use crate::security_admin_service::log_failed_audit;
use crate::{AuditEvent, CacheInvalidation, MutationOutcome};

use super::*;

impl UserService {
    /// Lists all users.
    pub async fn list_users(&self, actor: &UserIdentity) -> AppResult<Vec<User>> {
        self.authorization_service
            .authorize(actor, AdminAbility::UserView.as_str())
            .await?;
        self.user_repository.list_users().await
    }

    /// Returns one user.
    pub async fn find_user(&self, actor: &UserIdentity, user_id: UserId) -> AppResult<User> {
        self.authorization_service
            .authorize(actor, AdminAbility::UserView.as_str())
            .await?;
        self.existing_user(user_id).await
    }

    /// Returns the user behind an authenticated identity.
    pub async fn current_user(&self, identity: &UserIdentity) -> AppResult<User> {
        self.existing_user(UserId::from(identity)).await
    }

    /// Creates a user with a hashed password.
    pub async fn create_user(
        &self,
        actor: &UserIdentity,
        params: CreateUserParams,
    ) -> AppResult<MutationOutcome<User>> {
        self.authorization_service
            .authorize(actor, AdminAbility::UserCreate.as_str())
            .await?;

        let email = EmailAddress::new(params.email)?;
        validate_password(&params.password)?;
        let password_hash = self.password_hasher.hash_password(&params.password)?;

        let user = self
            .user_repository
            .create_user(CreateUserInput {
                name: validated_name(params.name)?,
                email,
                password_hash,
            })
            .await?;

        let outcome = self
            .after_user_change(actor, user.id(), AuditAction::UserCreated)
            .await;
        Ok(MutationOutcome {
            value: user,
            cache: outcome,
        })
    }

    /// Updates a user's name, email and optionally password.
    pub async fn update_user(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        params: UpdateUserParams,
    ) -> AppResult<MutationOutcome<User>> {
        self.authorization_service
            .authorize(actor, AdminAbility::UserEdit.as_str())
            .await?;

        let email = EmailAddress::new(params.email)?;
        let password_hash = match params.password.as_deref() {
            Some(password) => {
                validate_password(password)?;
                Some(self.password_hasher.hash_password(password)?)
            }
            None => None,
        };

        let user = self
            .user_repository
            .update_user(
                user_id,
                UpdateUserInput {
                    name: validated_name(params.name)?,
                    email,
                    password_hash,
                },
            )
            .await?;

        let outcome = self
            .after_user_change(actor, user_id, AuditAction::UserUpdated)
            .await;
        Ok(MutationOutcome {
            value: user,
            cache: outcome,
        })
    }

    /// Deletes a user. Users cannot delete themselves.
    pub async fn delete_user(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
    ) -> AppResult<MutationOutcome<()>> {
        self.authorization_service
            .authorize(actor, AdminAbility::UserDelete.as_str())
            .await?;

        if UserId::from(actor) == user_id {
            return Err(AppError::Conflict(
                "users cannot delete their own account".to_owned(),
            ));
        }

        self.user_repository.delete_user(user_id).await?;

        let outcome = self
            .after_user_change(actor, user_id, AuditAction::UserDeleted)
            .await;
        Ok(MutationOutcome {
            value: (),
            cache: outcome,
        })
    }

    async fn existing_user(&self, user_id: UserId) -> AppResult<User> {
        self.user_repository
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
    }

    async fn after_user_change(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        action: AuditAction,
    ) -> CacheInvalidation {
        let cache = self
            .permission_cache
            .invalidate_after_write(action.as_str(), &user_id.to_string())
            .await;

        info!(
            user_id = %user_id,
            action = action.as_str(),
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "user permission change"
        );

        let audit = self
            .audit_repository
            .append_event(AuditEvent {
                subject: actor.user_id().to_string(),
                action,
                resource_type: "user".to_owned(),
                resource_id: user_id.to_string(),
                detail: None,
            })
            .await;
        if let Err(error) = audit {
            log_failed_audit(action, &user_id.to_string(), &error);
        }

        cache
    }
}

fn validated_name(name: String) -> AppResult<String> {
    NonEmptyString::new(name).map(String::from)
}
