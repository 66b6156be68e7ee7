use super::*;

pub async fn clear_permission_cache_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<CacheClearedResponse>> {
    let permissions_version = state
        .security_admin_service
        .clear_permission_cache(&user)
        .await?;

    Ok(Json(CacheClearedResponse {
        permissions_version,
    }))
}

pub async fn refresh_permission_cache_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<gatehouse_domain::RoleSnapshot>> {
    let snapshot = state
        .security_admin_service
        .refresh_permission_cache(&user)
        .await?;

    Ok(Json(snapshot))
}

pub async fn permission_cache_metrics_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<PermissionCacheMetrics>> {
    let metrics = state
        .security_admin_service
        .permission_cache_metrics(&user)
        .await?;

    Ok(Json(metrics))
}

pub async fn authorization_debug_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<UserAuthorizationDebug>> {
    let target = state
        .user_service
        .find_user(&user, UserId::new(user_id))
        .await?;
    let debug = state
        .security_admin_service
        .debug_user_authorization(&user, &target)
        .await?;

    Ok(Json(debug))
}
