use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use gatehouse_application::{CreateUserParams, UpdateUserParams};
use gatehouse_core::UserIdentity;
use gatehouse_domain::UserId;

use crate::dto::{CreateUserRequest, MutationResponse, UpdateUserRequest, UserResponse};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state
        .user_service
        .list_users(&user)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(users))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<UserResponse>> {
    let found = state
        .user_service
        .find_user(&user, UserId::new(user_id))
        .await?;

    Ok(Json(UserResponse::from(found)))
}

pub async fn create_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<MutationResponse<UserResponse>>)> {
    let outcome = state
        .user_service
        .create_user(&user, CreateUserParams::from(&payload))
        .await
        .map_err(|error| ApiError::from(error).with_submitted(&payload))?;

    Ok((
        StatusCode::CREATED,
        Json(MutationResponse::from_outcome(outcome)),
    ))
}

pub async fn update_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<MutationResponse<UserResponse>>> {
    let outcome = state
        .user_service
        .update_user(&user, UserId::new(user_id), UpdateUserParams::from(&payload))
        .await
        .map_err(|error| ApiError::from(error).with_submitted(&payload))?;

    Ok(Json(MutationResponse::from_outcome(outcome)))
}

pub async fn delete_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<MutationResponse<()>>> {
    let outcome = state
        .user_service
        .delete_user(&user, UserId::new(user_id))
        .await?;

    Ok(Json(MutationResponse::from_outcome(outcome)))
}
