use async_trait::async_trait;
use serde::Serialize;

use gatehouse_core::AppResult;
use gatehouse_domain::{Permission, PermissionId, PermissionName, Role, RoleId, RoleName, UserId};

use crate::CacheInvalidation;

/// Input payload for creating or updating a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRoleInput {
    /// Unique role name.
    pub name: RoleName,
    /// Optional display label.
    pub display_name: Option<String>,
    /// Optional description.
    pub description: Option<String>,
}

/// Input payload for creating or updating a permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePermissionInput {
    /// Unique machine key.
    pub name: PermissionName,
    /// Grouping label.
    pub module: String,
    /// Human-readable label.
    pub display_name: String,
}

/// Difference applied by a permission sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PermissionSyncOutcome {
    /// Permissions newly attached to the role.
    pub attached: Vec<PermissionId>,
    /// Permissions removed from the role.
    pub detached: Vec<PermissionId>,
}

/// Result of a committed mutation together with its cache invalidation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationOutcome<T> {
    /// Mutation result.
    pub value: T,
    /// What happened to the permission cache afterwards.
    pub cache: CacheInvalidation,
}

/// Repository port for roles, permissions and their associations.
///
/// Every write runs in its own storage transaction and either fully commits
/// or leaves storage unchanged.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Lists all roles ordered by id.
    async fn list_roles(&self) -> AppResult<Vec<Role>>;

    /// Finds one role.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Creates a role. Names are unique ignoring case; a clash is a
    /// `Conflict`.
    async fn create_role(&self, input: SaveRoleInput) -> AppResult<Role>;

    /// Updates a role. Same name rule as `create_role`.
    async fn update_role(&self, role_id: RoleId, input: SaveRoleInput) -> AppResult<Role>;

    /// Deletes a role and its associations.
    async fn delete_role(&self, role_id: RoleId) -> AppResult<()>;

    /// Lists all permissions ordered by module and name.
    async fn list_permissions(&self) -> AppResult<Vec<Permission>>;

    /// Lists permission ids attached to a role.
    async fn list_role_permission_ids(&self, role_id: RoleId) -> AppResult<Vec<PermissionId>>;

    /// Creates a permission.
    async fn create_permission(&self, input: SavePermissionInput) -> AppResult<Permission>;

    /// Updates a permission.
    async fn update_permission(
        &self,
        permission_id: PermissionId,
        input: SavePermissionInput,
    ) -> AppResult<Permission>;

    /// Deletes a permission and its associations.
    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()>;

    /// Replaces a role's permission set: attaches missing ids, detaches
    /// extra ones and leaves the intersection untouched.
    async fn sync_role_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<PermissionSyncOutcome>;

    /// Attaches a role to a user. Attaching a held role is a no-op.
    async fn assign_role_to_user(&self, user_id: UserId, role_id: RoleId) -> AppResult<()>;

    /// Detaches a role from a user.
    async fn remove_role_from_user(&self, user_id: UserId, role_id: RoleId) -> AppResult<()>;

    /// Replaces all of a user's role associations with exactly one role.
    async fn replace_user_roles(&self, user_id: UserId, role_id: RoleId) -> AppResult<()>;
}
