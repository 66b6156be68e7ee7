use gatehouse_application::PasswordHasher;
use gatehouse_core::{AppError, AppResult};
use gatehouse_domain::AdminAbility;
use gatehouse_infrastructure::Argon2PasswordHasher;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

use crate::api_config::ApiConfig;
use crate::api_services;

const ADMIN_ROLE: (&str, &str, &str) = ("admin", "Administrador", "Full administrative access");
const USER_ROLE: (&str, &str, &str) = ("user", "Usuario", "Standard access");

const DEV_SEED_ADMIN_EMAIL: &str = "admin@example.com";
const DEV_SEED_ADMIN_NAME: &str = "Administrator";
const DEV_SEED_USER_EMAIL: &str = "user@example.com";
const DEV_SEED_USER_NAME: &str = "Standard User";
const DEV_SEED_PASSWORD: &str = "change-me-please";

/// Seeds the default roles, permissions and users, then invalidates the
/// permission cache so the new grants are visible immediately.
pub async fn run(pool: PgPool, config: &ApiConfig) -> AppResult<()> {
    let hasher = Argon2PasswordHasher::new();
    let password_hash = hasher.hash_password(DEV_SEED_PASSWORD)?;

    let mut transaction = pool
        .begin()
        .await
        .map_err(|error| AppError::Internal(format!("failed to begin seed transaction: {error}")))?;

    let admin_role_id = ensure_role(&mut transaction, ADMIN_ROLE).await?;
    let user_role_id = ensure_role(&mut transaction, USER_ROLE).await?;

    for ability in AdminAbility::all() {
        let permission_id = ensure_permission(&mut transaction, *ability).await?;
        grant(&mut transaction, permission_id, admin_role_id).await?;
    }

    let admin_id = ensure_user(
        &mut transaction,
        DEV_SEED_ADMIN_NAME,
        DEV_SEED_ADMIN_EMAIL,
        &password_hash,
    )
    .await?;
    let user_id = ensure_user(
        &mut transaction,
        DEV_SEED_USER_NAME,
        DEV_SEED_USER_EMAIL,
        &password_hash,
    )
    .await?;
    assign(&mut transaction, admin_id, admin_role_id).await?;
    assign(&mut transaction, user_id, user_role_id).await?;

    transaction
        .commit()
        .await
        .map_err(|error| AppError::Internal(format!("failed to commit seed data: {error}")))?;

    let app_state = api_services::build_app_state(pool, config)?;
    let version = app_state
        .authorization_service
        .permission_cache()
        .invalidate_all()
        .await?;

    info!(
        permissions_version = version,
        admin = DEV_SEED_ADMIN_EMAIL,
        user = DEV_SEED_USER_EMAIL,
        "development seed applied"
    );

    Ok(())
}

async fn ensure_role(
    transaction: &mut Transaction<'_, Postgres>,
    (name, display_name, description): (&str, &str, &str),
) -> AppResult<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO roles (name, display_name, description)
        VALUES ($1, $2, $3)
        ON CONFLICT ((LOWER(name))) DO UPDATE
        SET display_name = EXCLUDED.display_name,
            description = EXCLUDED.description
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(display_name)
    .bind(description)
    .fetch_one(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to seed role '{name}': {error}")))
}

async fn ensure_permission(
    transaction: &mut Transaction<'_, Postgres>,
    ability: AdminAbility,
) -> AppResult<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO permissions (name, module, display_name)
        VALUES ($1, $2, $3)
        ON CONFLICT (name) DO UPDATE
        SET module = EXCLUDED.module
        RETURNING id
        "#,
    )
    .bind(ability.as_str())
    .bind(ability.module())
    .bind(display_label(ability.as_str()))
    .fetch_one(&mut **transaction)
    .await
    .map_err(|error| {
        AppError::Internal(format!(
            "failed to seed permission '{}': {error}",
            ability.as_str()
        ))
    })
}

async fn ensure_user(
    transaction: &mut Transaction<'_, Postgres>,
    name: &str,
    email: &str,
    password_hash: &str,
) -> AppResult<i64> {
    let existing = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT id
        FROM users
        WHERE LOWER(email) = LOWER($1)
        "#,
    )
    .bind(email)
    .fetch_optional(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to look up seed user: {error}")))?;

    if let Some(user_id) = existing {
        return Ok(user_id);
    }

    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO users (name, email, password_hash)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to seed user '{email}': {error}")))
}

async fn grant(
    transaction: &mut Transaction<'_, Postgres>,
    permission_id: i64,
    role_id: i64,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO permission_role (permission_id, role_id)
        VALUES ($1, $2)
        ON CONFLICT (permission_id, role_id) DO NOTHING
        "#,
    )
    .bind(permission_id)
    .bind(role_id)
    .execute(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to seed role grant: {error}")))?;

    Ok(())
}

async fn assign(
    transaction: &mut Transaction<'_, Postgres>,
    user_id: i64,
    role_id: i64,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO role_user (user_id, role_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, role_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(role_id)
    .execute(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to seed role assignment: {error}")))?;

    Ok(())
}

fn display_label(permission: &str) -> String {
    let spaced = permission.replace('_', " ");
    let mut characters = spaced.chars();
    match characters.next() {
        Some(first) => first.to_uppercase().chain(characters).collect(),
        None => String::new(),
    }
}
