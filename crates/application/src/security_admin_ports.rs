mod audit;
mod authorization;
mod editor;
mod roles;

pub use audit::{AuditEvent, AuditRepository};
pub use authorization::{AuthorizationRepository, RoleGrantRow};
pub use editor::{PermissionModuleGroup, PermissionToggle, RolePermissionEditor};
pub use roles::{
    MutationOutcome, PermissionSyncOutcome, RoleRepository, SavePermissionInput, SaveRoleInput,
};
