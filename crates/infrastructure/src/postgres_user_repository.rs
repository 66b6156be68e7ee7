use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use gatehouse_application::{CreateUserInput, UpdateUserInput, UserCredentials, UserRepository};
use gatehouse_core::{AppError, AppResult};
use gatehouse_domain::{EmailAddress, User, UserId};


/// PostgreSQL-backed user repository.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> AppResult<Self> {
        User::new(UserId::new(row.id), row.name, EmailAddress::new(row.email)?)
    }
}

#[derive(Debug, FromRow)]
struct CredentialsRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
}

fn map_email_conflict(error: sqlx::Error, action: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict("email is already in use".to_owned());
    }

    AppError::Internal(format!("failed to {action} user: {error}"))
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn list_users(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list users: {error}")))?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user: {error}")))?;

        row.map(User::try_from).transpose()
    }

    async fn find_credentials_by_email(&self, email: &str) -> AppResult<Option<UserCredentials>> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            r#"
            SELECT id, name, email, password_hash
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find user by email: {error}"))
        })?;

        row.map(|row| {
            Ok(UserCredentials {
                user: User::new(UserId::new(row.id), row.name, EmailAddress::new(row.email)?)?,
                password_hash: row.password_hash,
            })
        })
        .transpose()
    }

    async fn create_user(&self, input: CreateUserInput) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email
            "#,
        )
        .bind(input.name.trim())
        .bind(input.email.as_str())
        .bind(input.password_hash.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_email_conflict(error, "create"))?;

        User::try_from(row)
    }

    async fn update_user(&self, user_id: UserId, input: UpdateUserInput) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET name = $2,
                email = $3,
                password_hash = COALESCE($4, password_hash),
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, email
            "#,
        )
        .bind(user_id.as_i64())
        .bind(input.name.trim())
        .bind(input.email.as_str())
        .bind(input.password_hash.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_email_conflict(error, "update"))?
        .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;

        User::try_from(row)
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete user: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' does not exist"
            )));
        }

        Ok(())
    }
}
