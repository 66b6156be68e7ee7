//! Application services and ports.

#![forbid(unsafe_code)]

mod authorization_service;
mod cache_ports;
mod permission_cache_service;
mod security_admin_ports;
mod security_admin_service;
mod user_service;

#[cfg(test)]
mod test_support;

pub use authorization_service::{AccessPolicy, AuthorizationService};
pub use cache_ports::{
    CacheStore, GLOBAL_ROLES_PERMISSIONS_KEY, PERMISSIONS_VERSION_KEY,
    USER_ROLES_PERMISSIONS_PREFIX, user_cache_key,
};
pub use permission_cache_service::{
    CacheGeneration, CacheInvalidation, DEFAULT_CACHE_TTL_MINUTES, PermissionCacheMetrics,
    PermissionCacheService, UserAuthorizationDebug,
};
pub use security_admin_ports::{
    AuditEvent, AuditRepository, AuthorizationRepository, MutationOutcome, PermissionModuleGroup,
    PermissionSyncOutcome, PermissionToggle, RoleGrantRow, RolePermissionEditor, RoleRepository,
    SavePermissionInput, SaveRoleInput,
};
pub use security_admin_service::SecurityAdminService;
pub use user_service::{
    AuthOutcome, CreateUserInput, CreateUserParams, PasswordHasher, UpdateUserInput,
    UpdateUserParams, UserCredentials, UserRepository, UserService,
};
