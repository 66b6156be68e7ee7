use std::collections::BTreeSet;

use gatehouse_core::UserIdentity;
use gatehouse_domain::UserResolution;
use serde::{Deserialize, Serialize};

/// Incoming payload for password login.
#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// The authenticated user with their resolved role and permissions.
#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    pub user_id: i64,
    pub display_name: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub permissions: BTreeSet<String>,
    pub permissions_version: u64,
}

impl CurrentUserResponse {
    pub fn new(identity: &UserIdentity, resolution: UserResolution) -> Self {
        Self {
            user_id: identity.user_id(),
            display_name: identity.display_name().to_owned(),
            email: identity.email().map(ToOwned::to_owned),
            role: resolution.role,
            permissions: resolution.permissions,
            permissions_version: resolution.version,
        }
    }
}
