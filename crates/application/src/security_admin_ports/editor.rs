use serde::Serialize;

use gatehouse_domain::{Permission, Role};

/// Permission row inside the role permission editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionToggle {
    /// Permission entity.
    pub permission: Permission,
    /// Whether the role currently holds the permission.
    pub granted: bool,
}

/// Permissions sharing one module label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionModuleGroup {
    /// Module label.
    pub module: String,
    /// Permissions in the module, ordered by name.
    pub permissions: Vec<PermissionToggle>,
}

/// Editing projection for one role's permission set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RolePermissionEditor {
    /// Role being edited.
    pub role: Role,
    /// All permissions grouped by module, ordered by module label.
    pub modules: Vec<PermissionModuleGroup>,
}
