use gatehouse_core::AppError;
use sqlx::PgPool;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::api_config::ApiConfig;

const SESSION_COOKIE_NAME: &str = "gatehouse_session";
const SESSION_TABLE: &str = "user_sessions";
const SESSION_IDLE_MINUTES: i64 = 30;

/// Session cookies backed by Postgres. The session only carries the signed-in
/// `UserIdentity`; roles and permissions are always resolved through the
/// permission cache.
pub async fn build_session_layer(
    pool: PgPool,
    config: &ApiConfig,
) -> Result<SessionManagerLayer<PostgresStore>, AppError> {
    let session_store = PostgresStore::new(pool)
        .with_table_name(SESSION_TABLE)
        .map_err(|error| AppError::Validation(format!("invalid session table name: {error}")))?;

    session_store
        .migrate()
        .await
        .map_err(|error| AppError::Internal(format!("failed to prepare session table: {error}")))?;

    Ok(SessionManagerLayer::new(session_store)
        .with_name(SESSION_COOKIE_NAME)
        .with_secure(config.cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(SESSION_IDLE_MINUTES))))
}
