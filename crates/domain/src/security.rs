use serde::{Deserialize, Serialize};

/// Abilities the administration surface checks through the permission gate.
///
/// These are ordinary permission names stored like any other permission; the
/// enum only pins the keys the application itself relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminAbility {
    /// Allows listing users.
    UserView,
    /// Allows creating users.
    UserCreate,
    /// Allows editing users and their role assignments.
    UserEdit,
    /// Allows deleting users.
    UserDelete,
    /// Allows listing roles.
    RoleView,
    /// Allows creating roles.
    RoleCreate,
    /// Allows editing roles and their permission sets.
    RoleEdit,
    /// Allows deleting roles.
    RoleDelete,
    /// Allows listing permissions.
    PermissionView,
    /// Allows creating permissions.
    PermissionCreate,
    /// Allows editing permissions.
    PermissionEdit,
    /// Allows deleting permissions.
    PermissionDelete,
}

impl AdminAbility {
    /// Returns the stored permission name for this ability.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserView => "user_view",
            Self::UserCreate => "user_create",
            Self::UserEdit => "user_edit",
            Self::UserDelete => "user_delete",
            Self::RoleView => "role_view",
            Self::RoleCreate => "role_create",
            Self::RoleEdit => "role_edit",
            Self::RoleDelete => "role_delete",
            Self::PermissionView => "permission_view",
            Self::PermissionCreate => "permission_create",
            Self::PermissionEdit => "permission_edit",
            Self::PermissionDelete => "permission_delete",
        }
    }

    /// Returns the module label the ability is grouped under.
    #[must_use]
    pub fn module(&self) -> &'static str {
        match self {
            Self::UserView | Self::UserCreate | Self::UserEdit | Self::UserDelete => "users",
            Self::RoleView | Self::RoleCreate | Self::RoleEdit | Self::RoleDelete => "roles",
            Self::PermissionView
            | Self::PermissionCreate
            | Self::PermissionEdit
            | Self::PermissionDelete => "permissions",
        }
    }

    /// Returns all known abilities.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[AdminAbility] = &[
            AdminAbility::UserView,
            AdminAbility::UserCreate,
            AdminAbility::UserEdit,
            AdminAbility::UserDelete,
            AdminAbility::RoleView,
            AdminAbility::RoleCreate,
            AdminAbility::RoleEdit,
            AdminAbility::RoleDelete,
            AdminAbility::PermissionView,
            AdminAbility::PermissionCreate,
            AdminAbility::PermissionEdit,
            AdminAbility::PermissionDelete,
        ];

        ALL
    }
}

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a user is created.
    UserCreated,
    /// Emitted when a user is updated.
    UserUpdated,
    /// Emitted when a user is deleted.
    UserDeleted,
    /// Emitted when a role is added to a user.
    RoleAssigned,
    /// Emitted when a role is removed from a user.
    RoleUnassigned,
    /// Emitted when a user's roles are replaced by a single role.
    RoleChanged,
    /// Emitted when a role is created.
    RoleCreated,
    /// Emitted when a role is updated.
    RoleUpdated,
    /// Emitted when a role is deleted.
    RoleDeleted,
    /// Emitted when a role's permission set is replaced.
    RolePermissionsSynced,
    /// Emitted when a permission is created.
    PermissionCreated,
    /// Emitted when a permission is updated.
    PermissionUpdated,
    /// Emitted when a permission is deleted.
    PermissionDeleted,
    /// Emitted when an administrator forces a full cache invalidation.
    PermissionCacheCleared,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserCreated => "user.created",
            Self::UserUpdated => "user.updated",
            Self::UserDeleted => "user.deleted",
            Self::RoleAssigned => "user.role.assigned",
            Self::RoleUnassigned => "user.role.unassigned",
            Self::RoleChanged => "user.role.changed",
            Self::RoleCreated => "role.created",
            Self::RoleUpdated => "role.updated",
            Self::RoleDeleted => "role.deleted",
            Self::RolePermissionsSynced => "role.permissions.synced",
            Self::PermissionCreated => "permission.created",
            Self::PermissionUpdated => "permission.updated",
            Self::PermissionDeleted => "permission.deleted",
            Self::PermissionCacheCleared => "permission_cache.cleared",
        }
    }
}
