use super::*;

pub async fn list_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = state
        .security_admin_service
        .list_permissions(&user)
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn create_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<SavePermissionRequest>,
) -> ApiResult<(StatusCode, Json<MutationResponse<PermissionResponse>>)> {
    let reject = |error: AppError| ApiError::from(error).with_submitted(&payload);
    let input = payload.to_input().map_err(reject)?;
    let outcome = state
        .security_admin_service
        .create_permission(&user, input)
        .await
        .map_err(reject)?;

    Ok((
        StatusCode::CREATED,
        Json(MutationResponse::from_outcome(outcome)),
    ))
}

pub async fn update_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(permission_id): Path<i64>,
    Json(payload): Json<SavePermissionRequest>,
) -> ApiResult<Json<MutationResponse<PermissionResponse>>> {
    let reject = |error: AppError| ApiError::from(error).with_submitted(&payload);
    let input = payload.to_input().map_err(reject)?;
    let outcome = state
        .security_admin_service
        .update_permission(&user, PermissionId::new(permission_id), input)
        .await
        .map_err(reject)?;

    Ok(Json(MutationResponse::from_outcome(outcome)))
}

pub async fn delete_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(permission_id): Path<i64>,
) -> ApiResult<Json<MutationResponse<()>>> {
    let outcome = state
        .security_admin_service
        .delete_permission(&user, PermissionId::new(permission_id))
        .await?;

    Ok(Json(MutationResponse::from_outcome(outcome)))
}
