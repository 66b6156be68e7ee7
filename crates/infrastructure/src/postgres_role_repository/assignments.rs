use super::*;

impl PostgresRoleRepository {
    pub(super) async fn assign_role_to_user_impl(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<()> {
        let mut transaction = self.begin().await?;
        ensure_user_exists(&mut transaction, user_id).await?;

        sqlx::query(
            r#"
            INSERT INTO role_user (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_i64())
        .bind(role_id.as_i64())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to assign role: {error}")))?;

        commit(transaction).await
    }

    pub(super) async fn remove_role_from_user_impl(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<()> {
        let mut transaction = self.begin().await?;
        ensure_user_exists(&mut transaction, user_id).await?;

        sqlx::query(
            r#"
            DELETE FROM role_user
            WHERE user_id = $1
                AND role_id = $2
            "#,
        )
        .bind(user_id.as_i64())
        .bind(role_id.as_i64())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove role: {error}")))?;

        commit(transaction).await
    }

    pub(super) async fn replace_user_roles_impl(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<()> {
        let mut transaction = self.begin().await?;
        ensure_user_exists(&mut transaction, user_id).await?;

        sqlx::query(
            r#"
            DELETE FROM role_user
            WHERE user_id = $1
                AND role_id <> $2
            "#,
        )
        .bind(user_id.as_i64())
        .bind(role_id.as_i64())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to clear user roles: {error}")))?;

        sqlx::query(
            r#"
            INSERT INTO role_user (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_i64())
        .bind(role_id.as_i64())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to assign role: {error}")))?;

        commit(transaction).await
    }
}

async fn ensure_user_exists(
    transaction: &mut Transaction<'_, Postgres>,
    user_id: UserId,
) -> AppResult<()> {
    let exists = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT id
        FROM users
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(user_id.as_i64())
    .fetch_optional(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to lock user: {error}")))?;

    if exists.is_none() {
        return Err(AppError::NotFound(format!(
            "user '{user_id}' does not exist"
        )));
    }

    Ok(())
}
