mod auth;
mod authorization;
mod security;
mod users;

pub use auth::{CurrentUserResponse, LoginRequest};
pub use authorization::{AuthorizationCheckQuery, AuthorizationCheckResponse};
pub use security::{
    CacheClearedResponse, ChangeRoleRequest, MutationResponse, PermissionResponse,
    RoleResponse, SavePermissionRequest, SaveRoleRequest, SyncRolePermissionsRequest,
};
pub use users::{CreateUserRequest, UpdateUserRequest, UserResponse};

/// Health response payload.
#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ready: bool,
    pub postgres: HealthDependencyStatus,
    pub cache: HealthDependencyStatus,
}

/// Health of one backing dependency.
#[derive(Debug, serde::Serialize)]
pub struct HealthDependencyStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
