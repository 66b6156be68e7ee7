use async_trait::async_trait;
use gatehouse_core::AppResult;
use gatehouse_domain::{RoleId, UserId};

/// One role/permission association row used to build the global snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrantRow {
    /// Role identifier.
    pub role_id: RoleId,
    /// Role name.
    pub role_name: String,
    /// Attached permission name, `None` for a role without permissions.
    pub permission_name: Option<String>,
}

/// Read-side repository used to resolve authorization data from storage.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Lists every role joined with its permissions.
    async fn list_role_grant_rows(&self) -> AppResult<Vec<RoleGrantRow>>;

    /// Finds the name of the user's effective role.
    ///
    /// Users hold at most one effective role; when storage holds several
    /// associations the one with the lowest role id wins.
    async fn find_primary_role_name(&self, user_id: UserId) -> AppResult<Option<String>>;
}
