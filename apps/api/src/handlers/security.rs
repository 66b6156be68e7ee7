use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use gatehouse_application::{
    PermissionCacheMetrics, PermissionSyncOutcome, RolePermissionEditor, UserAuthorizationDebug,
};
use gatehouse_core::{AppError, UserIdentity};
use gatehouse_domain::{PermissionId, RoleId, UserId};

use crate::dto::{
    CacheClearedResponse, ChangeRoleRequest, MutationResponse, PermissionResponse, RoleResponse,
    SavePermissionRequest, SaveRoleRequest, SyncRolePermissionsRequest,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

mod assignments;
mod cache;
mod permissions;
mod roles;

pub use assignments::{assign_role_handler, change_role_handler, remove_role_handler};
pub use cache::{
    authorization_debug_handler, clear_permission_cache_handler, permission_cache_metrics_handler,
    refresh_permission_cache_handler,
};
pub use permissions::{
    create_permission_handler, delete_permission_handler, list_permissions_handler,
    update_permission_handler,
};
pub use roles::{
    create_role_handler, delete_role_handler, list_roles_handler, role_permission_editor_handler,
    sync_role_permissions_handler, update_role_handler,
};
