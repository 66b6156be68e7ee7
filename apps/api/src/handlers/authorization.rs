use axum::Json;
use axum::extract::{Extension, Query, State};
use gatehouse_core::UserIdentity;
use gatehouse_domain::{RoleSpec, UserId};

use crate::dto::{AuthorizationCheckQuery, AuthorizationCheckResponse};
use crate::state::AppState;

/// Answers role and permission checks for presentation layers. Every check
/// fails closed.
pub async fn authorization_check_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<AuthorizationCheckQuery>,
) -> Json<AuthorizationCheckResponse> {
    let user_id = UserId::from(&user);
    let authorization = &state.authorization_service;

    let role = match query.roles.as_deref() {
        Some(roles) => Some(
            authorization
                .check_role(user_id, &RoleSpec::parse(roles))
                .await,
        ),
        None => None,
    };
    let permission = match query.permission.as_deref() {
        Some(permission) => Some(authorization.check_permission(user_id, permission).await),
        None => None,
    };
    let any_permission = match query.any_permission_names() {
        Some(permissions) => Some(
            authorization
                .check_any_permission(user_id, &permissions)
                .await,
        ),
        None => None,
    };

    Json(AuthorizationCheckResponse {
        role,
        permission,
        any_permission,
    })
}
