//! PostgreSQL-backed role and permission administration.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use gatehouse_application::{
    PermissionSyncOutcome, RoleRepository, SavePermissionInput, SaveRoleInput,
};
use gatehouse_core::{AppError, AppResult};
use gatehouse_domain::{
    Permission, PermissionId, PermissionName, Role, RoleId, RoleName, UserId,
};

mod assignments;
mod permissions;
mod roles;


/// PostgreSQL implementation of the role repository port.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> AppResult<Transaction<'_, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: i64,
    name: String,
    display_name: Option<String>,
    description: Option<String>,
}

impl TryFrom<RoleRow> for Role {
    type Error = AppError;

    fn try_from(row: RoleRow) -> AppResult<Self> {
        Ok(Role::new(
            RoleId::new(row.id),
            RoleName::new(row.name)?,
            row.display_name,
            row.description,
        ))
    }
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    id: i64,
    name: String,
    module: String,
    display_name: String,
}

impl TryFrom<PermissionRow> for Permission {
    type Error = AppError;

    fn try_from(row: PermissionRow) -> AppResult<Self> {
        Ok(Permission::new(
            PermissionId::new(row.id),
            PermissionName::new(row.name)?,
            row.module,
            row.display_name,
        ))
    }
}

async fn commit(transaction: Transaction<'_, Postgres>) -> AppResult<()> {
    transaction
        .commit()
        .await
        .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))
}

fn map_unique_conflict(error: sqlx::Error, kind: &str, name: &str, action: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!("{kind} '{name}' already exists"));
    }

    AppError::Internal(format!("failed to {action} {kind}: {error}"))
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.list_roles_impl().await
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        self.find_role_impl(role_id).await
    }

    async fn create_role(&self, input: SaveRoleInput) -> AppResult<Role> {
        self.create_role_impl(input).await
    }

    async fn update_role(&self, role_id: RoleId, input: SaveRoleInput) -> AppResult<Role> {
        self.update_role_impl(role_id, input).await
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        self.delete_role_impl(role_id).await
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        self.list_permissions_impl().await
    }

    async fn list_role_permission_ids(&self, role_id: RoleId) -> AppResult<Vec<PermissionId>> {
        self.list_role_permission_ids_impl(role_id).await
    }

    async fn create_permission(&self, input: SavePermissionInput) -> AppResult<Permission> {
        self.create_permission_impl(input).await
    }

    async fn update_permission(
        &self,
        permission_id: PermissionId,
        input: SavePermissionInput,
    ) -> AppResult<Permission> {
        self.update_permission_impl(permission_id, input).await
    }

    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        self.delete_permission_impl(permission_id).await
    }

    async fn sync_role_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<PermissionSyncOutcome> {
        self.sync_role_permissions_impl(role_id, permission_ids)
            .await
    }

    async fn assign_role_to_user(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        self.assign_role_to_user_impl(user_id, role_id).await
    }

    async fn remove_role_from_user(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        self.remove_role_from_user_impl(user_id, role_id).await
    }

    async fn replace_user_roles(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        self.replace_user_roles_impl(user_id, role_id).await
    }
}
