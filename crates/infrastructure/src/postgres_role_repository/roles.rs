use super::*;

impl PostgresRoleRepository {
    pub(super) async fn list_roles_impl(&self) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, display_name, description
            FROM roles
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        rows.into_iter().map(Role::try_from).collect()
    }

    pub(super) async fn find_role_impl(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, display_name, description
            FROM roles
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role: {error}")))?;

        row.map(Role::try_from).transpose()
    }

    pub(super) async fn create_role_impl(&self, input: SaveRoleInput) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            INSERT INTO roles (name, display_name, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, display_name, description
            "#,
        )
        .bind(input.name.as_str())
        .bind(input.display_name.as_deref())
        .bind(input.description.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_unique_conflict(error, "role", input.name.as_str(), "create"))?;

        Role::try_from(row)
    }

    pub(super) async fn update_role_impl(
        &self,
        role_id: RoleId,
        input: SaveRoleInput,
    ) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            UPDATE roles
            SET name = $2,
                display_name = $3,
                description = $4,
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, display_name, description
            "#,
        )
        .bind(role_id.as_i64())
        .bind(input.name.as_str())
        .bind(input.display_name.as_deref())
        .bind(input.description.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_unique_conflict(error, "role", input.name.as_str(), "update"))?
        .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;

        Role::try_from(row)
    }

    pub(super) async fn delete_role_impl(&self, role_id: RoleId) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM roles
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete role: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' does not exist"
            )));
        }

        Ok(())
    }
}
