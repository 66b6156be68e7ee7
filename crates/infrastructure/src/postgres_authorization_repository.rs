use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use gatehouse_application::{AuthorizationRepository, RoleGrantRow};
use gatehouse_core::{AppError, AppResult};
use gatehouse_domain::{RoleId, UserId};

/// PostgreSQL-backed repository for resolving authorization data.
#[derive(Clone)]
pub struct PostgresAuthorizationRepository {
    pool: PgPool,
}

impl PostgresAuthorizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct GrantRow {
    role_id: i64,
    role_name: String,
    permission_name: Option<String>,
}

#[async_trait]
impl AuthorizationRepository for PostgresAuthorizationRepository {
    async fn list_role_grant_rows(&self) -> AppResult<Vec<RoleGrantRow>> {
        let rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT
                roles.id AS role_id,
                roles.name AS role_name,
                permissions.name AS permission_name
            FROM roles
            LEFT JOIN permission_role
                ON permission_role.role_id = roles.id
            LEFT JOIN permissions
                ON permissions.id = permission_role.permission_id
            ORDER BY roles.id, permissions.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list role grants: {error}")))?;

        Ok(rows
            .into_iter()
            .map(|row| RoleGrantRow {
                role_id: RoleId::new(row.role_id),
                role_name: row.role_name,
                permission_name: row.permission_name,
            })
            .collect())
    }

    async fn find_primary_role_name(&self, user_id: UserId) -> AppResult<Option<String>> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT roles.name
            FROM role_user
            INNER JOIN roles
                ON roles.id = role_user.role_id
            WHERE role_user.user_id = $1
            ORDER BY roles.id
            LIMIT 1
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to resolve role for user '{user_id}': {error}"
            ))
        })
    }
}
