use super::*;

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .security_admin_service
        .list_roles(&user)
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<SaveRoleRequest>,
) -> ApiResult<(StatusCode, Json<MutationResponse<RoleResponse>>)> {
    let reject = |error: AppError| ApiError::from(error).with_submitted(&payload);
    let input = payload.to_input().map_err(reject)?;
    let outcome = state
        .security_admin_service
        .create_role(&user, input)
        .await
        .map_err(reject)?;

    Ok((
        StatusCode::CREATED,
        Json(MutationResponse::from_outcome(outcome)),
    ))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<i64>,
    Json(payload): Json<SaveRoleRequest>,
) -> ApiResult<Json<MutationResponse<RoleResponse>>> {
    let reject = |error: AppError| ApiError::from(error).with_submitted(&payload);
    let input = payload.to_input().map_err(reject)?;
    let outcome = state
        .security_admin_service
        .update_role(&user, RoleId::new(role_id), input)
        .await
        .map_err(reject)?;

    Ok(Json(MutationResponse::from_outcome(outcome)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<i64>,
) -> ApiResult<Json<MutationResponse<()>>> {
    let outcome = state
        .security_admin_service
        .delete_role(&user, RoleId::new(role_id))
        .await?;

    Ok(Json(MutationResponse::from_outcome(outcome)))
}

pub async fn role_permission_editor_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<i64>,
) -> ApiResult<Json<RolePermissionEditor>> {
    let editor = state
        .security_admin_service
        .role_permission_editor(&user, RoleId::new(role_id))
        .await?;

    Ok(Json(editor))
}

pub async fn sync_role_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<i64>,
    Json(payload): Json<SyncRolePermissionsRequest>,
) -> ApiResult<Json<MutationResponse<PermissionSyncOutcome>>> {
    let outcome = state
        .security_admin_service
        .sync_role_permissions(&user, RoleId::new(role_id), payload.permission_ids())
        .await
        .map_err(|error| ApiError::from(error).with_submitted(&payload))?;

    Ok(Json(MutationResponse::from_outcome(outcome)))
}
