//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod permission;
mod resolution;
mod role;
mod role_spec;
mod security;
mod user;

pub use permission::{Permission, PermissionId, PermissionName};
pub use resolution::{RoleGrant, RoleSnapshot, UserResolution};
pub use role::{Role, RoleId, RoleName};
pub use role_spec::RoleSpec;
pub use security::{AdminAbility, AuditAction};
pub use user::{
    EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, User, UserId, validate_password,
};
