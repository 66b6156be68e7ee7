//! Derived authorization data cached by the permission cache.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{RoleId, RoleSpec};

/// Permissions granted to one role inside a [`RoleSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrant {
    /// Role identifier.
    pub id: RoleId,
    /// Permission names attached to the role.
    pub permissions: BTreeSet<String>,
}

/// Global mapping from role name to its grant, derived from storage.
///
/// Depends only on committed role and permission associations, so two
/// snapshots built from the same storage state are equal regardless of row
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSnapshot {
    roles: BTreeMap<String, RoleGrant>,
}

impl RoleSnapshot {
    /// Builds a snapshot from `(role id, role name, permission name)` rows.
    ///
    /// Roles without permissions appear with a `None` permission and end up
    /// with an empty grant.
    #[must_use]
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (RoleId, String, Option<String>)>,
    {
        let mut roles: BTreeMap<String, RoleGrant> = BTreeMap::new();
        for (role_id, role_name, permission) in rows {
            let grant = roles.entry(role_name).or_insert_with(|| RoleGrant {
                id: role_id,
                permissions: BTreeSet::new(),
            });

            if let Some(permission) = permission {
                grant.permissions.insert(permission);
            }
        }

        Self { roles }
    }

    /// Returns the grant for a role name, if the role exists.
    #[must_use]
    pub fn grant(&self, role_name: &str) -> Option<&RoleGrant> {
        self.roles.get(role_name)
    }

    /// Returns the permission names of a role, empty when the role is unknown.
    #[must_use]
    pub fn permissions_for(&self, role_name: &str) -> BTreeSet<String> {
        self.grant(role_name)
            .map(|grant| grant.permissions.clone())
            .unwrap_or_default()
    }

    /// Returns all role names in the snapshot.
    #[must_use]
    pub fn role_names(&self) -> Vec<String> {
        self.roles.keys().cloned().collect()
    }

    /// Returns whether the snapshot holds no roles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

/// One user's resolved role and permissions for a cache generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResolution {
    /// Resolved role name, if the user holds one.
    pub role: Option<String>,
    /// Permission names granted through the role.
    pub permissions: BTreeSet<String>,
    /// Unix timestamp (seconds) when the resolution was computed.
    pub cached_at: i64,
    /// Cache generation the resolution belongs to. Zero when computed
    /// without access to the generation counter.
    pub version: u64,
}

impl UserResolution {
    /// Resolves a user's permissions from their role and the global snapshot.
    #[must_use]
    pub fn resolve(
        role: Option<String>,
        snapshot: &RoleSnapshot,
        cached_at: i64,
        version: u64,
    ) -> Self {
        let permissions = role
            .as_deref()
            .map(|role_name| snapshot.permissions_for(role_name))
            .unwrap_or_default();

        Self {
            role,
            permissions,
            cached_at,
            version,
        }
    }

    /// Exact, case-sensitive permission membership test.
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Returns whether any of the supplied permission names is held.
    #[must_use]
    pub fn has_any_permission<I, S>(&self, permissions: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        permissions
            .into_iter()
            .any(|permission| self.has_permission(permission.as_ref()))
    }

    /// Returns whether the resolved role matches any name in the role list.
    #[must_use]
    pub fn has_any_role(&self, roles: &RoleSpec) -> bool {
        roles.matches(self.role.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<(RoleId, String, Option<String>)> {
        vec![
            (RoleId::new(1), "admin".to_owned(), Some("user_view".to_owned())),
            (RoleId::new(1), "admin".to_owned(), Some("user_create".to_owned())),
            (RoleId::new(2), "user".to_owned(), None),
        ]
    }

    #[test]
    fn snapshot_groups_permissions_by_role() {
        let snapshot = RoleSnapshot::from_rows(rows());
        assert_eq!(snapshot.role_names(), ["admin", "user"]);
        assert_eq!(snapshot.permissions_for("admin").len(), 2);
        assert!(snapshot.permissions_for("user").is_empty());
        assert!(snapshot.permissions_for("ghost").is_empty());
    }

    #[test]
    fn snapshot_is_independent_of_row_order() {
        let mut reversed = rows();
        reversed.reverse();
        assert_eq!(RoleSnapshot::from_rows(rows()), RoleSnapshot::from_rows(reversed));
    }

    #[test]
    fn snapshot_serializes_as_role_map() {
        let snapshot = RoleSnapshot::from_rows(rows());
        let json = serde_json::to_value(&snapshot).unwrap_or_default();
        assert_eq!(json["admin"]["id"], 1);
        assert_eq!(json["admin"]["permissions"][0], "user_create");
    }

    #[test]
    fn resolution_checks_are_exact() {
        let snapshot = RoleSnapshot::from_rows(rows());
        let resolution = UserResolution::resolve(Some("admin".to_owned()), &snapshot, 0, 3);

        assert!(resolution.has_permission("user_create"));
        assert!(!resolution.has_permission("USER_CREATE"));
        assert!(resolution.has_any_permission(["role_view", "user_view"]));
        assert!(resolution.has_any_role(&RoleSpec::parse("Admin, Editor")));
    }

    #[test]
    fn user_without_role_has_nothing() {
        let snapshot = RoleSnapshot::from_rows(rows());
        let resolution = UserResolution::resolve(None, &snapshot, 0, 1);

        assert!(resolution.permissions.is_empty());
        assert!(!resolution.has_any_role(&RoleSpec::parse("admin,user")));
    }
}
