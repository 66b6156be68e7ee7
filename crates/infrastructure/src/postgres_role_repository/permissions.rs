use std::collections::BTreeSet;

use super::*;

impl PostgresRoleRepository {
    pub(super) async fn list_permissions_impl(&self) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, name, module, display_name
            FROM permissions
            ORDER BY module, name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list permissions: {error}")))?;

        rows.into_iter().map(Permission::try_from).collect()
    }

    pub(super) async fn list_role_permission_ids_impl(
        &self,
        role_id: RoleId,
    ) -> AppResult<Vec<PermissionId>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT permission_id
            FROM permission_role
            WHERE role_id = $1
            ORDER BY permission_id
            "#,
        )
        .bind(role_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list role permissions: {error}"))
        })?;

        Ok(ids.into_iter().map(PermissionId::new).collect())
    }

    pub(super) async fn create_permission_impl(
        &self,
        input: SavePermissionInput,
    ) -> AppResult<Permission> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            INSERT INTO permissions (name, module, display_name)
            VALUES ($1, $2, $3)
            RETURNING id, name, module, display_name
            "#,
        )
        .bind(input.name.as_str())
        .bind(input.module.trim())
        .bind(input.display_name.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            map_unique_conflict(error, "permission", input.name.as_str(), "create")
        })?;

        Permission::try_from(row)
    }

    pub(super) async fn update_permission_impl(
        &self,
        permission_id: PermissionId,
        input: SavePermissionInput,
    ) -> AppResult<Permission> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            UPDATE permissions
            SET name = $2,
                module = $3,
                display_name = $4,
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, module, display_name
            "#,
        )
        .bind(permission_id.as_i64())
        .bind(input.name.as_str())
        .bind(input.module.trim())
        .bind(input.display_name.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            map_unique_conflict(error, "permission", input.name.as_str(), "update")
        })?
        .ok_or_else(|| {
            AppError::NotFound(format!("permission '{permission_id}' does not exist"))
        })?;

        Permission::try_from(row)
    }

    pub(super) async fn delete_permission_impl(&self, permission_id: PermissionId) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM permissions
            WHERE id = $1
            "#,
        )
        .bind(permission_id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete permission: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "permission '{permission_id}' does not exist"
            )));
        }

        Ok(())
    }

    pub(super) async fn sync_role_permissions_impl(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<PermissionSyncOutcome> {
        let mut transaction = self.begin().await?;

        let role_exists = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id
            FROM roles
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(role_id.as_i64())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock role: {error}")))?;

        if role_exists.is_none() {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' does not exist"
            )));
        }

        let current: BTreeSet<i64> = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT permission_id
            FROM permission_role
            WHERE role_id = $1
            "#,
        )
        .bind(role_id.as_i64())
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to read role permissions: {error}"))
        })?
        .into_iter()
        .collect();

        let wanted: BTreeSet<i64> = permission_ids.iter().map(PermissionId::as_i64).collect();
        let attached: Vec<i64> = wanted.difference(&current).copied().collect();
        let detached: Vec<i64> = current.difference(&wanted).copied().collect();

        if !detached.is_empty() {
            sqlx::query(
                r#"
                DELETE FROM permission_role
                WHERE role_id = $1
                    AND permission_id = ANY($2)
                "#,
            )
            .bind(role_id.as_i64())
            .bind(&detached)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to detach role permissions: {error}"))
            })?;
        }

        if !attached.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO permission_role (permission_id, role_id)
                SELECT permission_id, $1
                FROM UNNEST($2::BIGINT[]) AS attached(permission_id)
                ON CONFLICT (permission_id, role_id) DO NOTHING
                "#,
            )
            .bind(role_id.as_i64())
            .bind(&attached)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to attach role permissions: {error}"))
            })?;
        }

        commit(transaction).await?;

        Ok(PermissionSyncOutcome {
            attached: attached.into_iter().map(PermissionId::new).collect(),
            detached: detached.into_iter().map(PermissionId::new).collect(),
        })
    }
}
