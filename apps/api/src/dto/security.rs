use gatehouse_application::{CacheInvalidation, MutationOutcome, SavePermissionInput, SaveRoleInput};
use gatehouse_core::AppResult;
use gatehouse_domain::{Permission, PermissionId, PermissionName, Role, RoleId, RoleName};
use serde::{Deserialize, Serialize};

/// Incoming payload for role creation and updates.
#[derive(Debug, Deserialize, Serialize)]
pub struct SaveRoleRequest {
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
}

impl SaveRoleRequest {
    pub fn to_input(&self) -> AppResult<SaveRoleInput> {
        Ok(SaveRoleInput {
            name: RoleName::new(self.name.as_str())?,
            display_name: non_blank(self.display_name.as_deref()),
            description: non_blank(self.description.as_deref()),
        })
    }
}

/// Incoming payload for permission creation and updates.
#[derive(Debug, Deserialize, Serialize)]
pub struct SavePermissionRequest {
    pub name: String,
    pub module: String,
    pub display_name: String,
}

impl SavePermissionRequest {
    pub fn to_input(&self) -> AppResult<SavePermissionInput> {
        Ok(SavePermissionInput {
            name: PermissionName::new(self.name.as_str())?,
            module: self.module.trim().to_owned(),
            display_name: self.display_name.trim().to_owned(),
        })
    }
}

/// Incoming payload for replacing a role's permission set.
#[derive(Debug, Deserialize, Serialize)]
pub struct SyncRolePermissionsRequest {
    pub permission_ids: Vec<i64>,
}

impl SyncRolePermissionsRequest {
    pub fn permission_ids(&self) -> Vec<PermissionId> {
        self.permission_ids
            .iter()
            .copied()
            .map(PermissionId::new)
            .collect()
    }
}

/// Incoming payload for replacing a user's role.
#[derive(Debug, Deserialize, Serialize)]
pub struct ChangeRoleRequest {
    pub role_id: i64,
}

impl ChangeRoleRequest {
    pub fn role_id(&self) -> RoleId {
        RoleId::new(self.role_id)
    }
}

/// API representation of a role.
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub role_id: i64,
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        Self {
            role_id: role.id().as_i64(),
            name: role.name().as_str().to_owned(),
            display_name: role.display_name().map(ToOwned::to_owned),
            description: role.description().map(ToOwned::to_owned),
        }
    }
}

/// API representation of a permission.
#[derive(Debug, Serialize)]
pub struct PermissionResponse {
    pub permission_id: i64,
    pub name: String,
    pub module: String,
    pub display_name: String,
}

impl From<Permission> for PermissionResponse {
    fn from(permission: Permission) -> Self {
        Self {
            permission_id: permission.id().as_i64(),
            name: permission.name().as_str().to_owned(),
            module: permission.module().to_owned(),
            display_name: permission.display_name().to_owned(),
        }
    }
}

/// Result of a committed write and what happened to the permission cache.
#[derive(Debug, Serialize)]
pub struct MutationResponse<T> {
    pub data: T,
    pub cache: CacheInvalidation,
}

impl<T> MutationResponse<T> {
    pub fn from_outcome<S>(outcome: MutationOutcome<S>) -> Self
    where
        T: From<S>,
    {
        Self {
            data: T::from(outcome.value),
            cache: outcome.cache,
        }
    }
}

/// Result of a forced cache clear.
#[derive(Debug, Serialize)]
pub struct CacheClearedResponse {
    pub permissions_version: u64,
}

pub(super) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}
