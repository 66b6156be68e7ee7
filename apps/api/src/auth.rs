use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use gatehouse_application::AuthOutcome;
use gatehouse_core::{AppError, UserIdentity};
use gatehouse_domain::UserId;
use tower_sessions::Session;
use tracing::info;

use crate::dto::{CurrentUserResponse, LoginRequest};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub const SESSION_USER_KEY: &str = "user_identity";

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<CurrentUserResponse>> {
    let outcome = state
        .user_service
        .login(payload.email.as_str(), payload.password.as_str())
        .await?;

    let AuthOutcome::Authenticated(user) = outcome else {
        return Err(
            ApiError::from(AppError::Unauthorized("invalid email or password".to_owned()))
                .with_submitted(&payload),
        );
    };

    let identity = UserIdentity::new(
        user.id().as_i64(),
        user.name(),
        Some(user.email().as_str().to_owned()),
    );

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to rotate session id: {error}")))?;
    session
        .insert(SESSION_USER_KEY, &identity)
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist session: {error}")))?;

    info!(user_id = %user.id(), "user signed in");

    let resolution = state.authorization_service.resolve(user.id()).await?;
    Ok(Json(CurrentUserResponse::new(&identity, resolution)))
}

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<CurrentUserResponse>> {
    let resolution = state
        .authorization_service
        .resolve(UserId::from(&identity))
        .await?;

    Ok(Json(CurrentUserResponse::new(&identity, resolution)))
}
