use super::*;

pub async fn assign_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((user_id, role_id)): Path<(i64, i64)>,
) -> ApiResult<Json<MutationResponse<()>>> {
    let outcome = state
        .security_admin_service
        .assign_role(&user, UserId::new(user_id), RoleId::new(role_id))
        .await?;

    Ok(Json(MutationResponse::from_outcome(outcome)))
}

pub async fn remove_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((user_id, role_id)): Path<(i64, i64)>,
) -> ApiResult<Json<MutationResponse<()>>> {
    let outcome = state
        .security_admin_service
        .remove_role(&user, UserId::new(user_id), RoleId::new(role_id))
        .await?;

    Ok(Json(MutationResponse::from_outcome(outcome)))
}

pub async fn change_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<i64>,
    Json(payload): Json<ChangeRoleRequest>,
) -> ApiResult<Json<MutationResponse<()>>> {
    let outcome = state
        .security_admin_service
        .change_role(&user, UserId::new(user_id), payload.role_id())
        .await
        .map_err(|error| ApiError::from(error).with_submitted(&payload))?;

    Ok(Json(MutationResponse::from_outcome(outcome)))
}
