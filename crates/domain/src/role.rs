use gatehouse_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Unique identifier for a role record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoleId(i64);

impl RoleId {
    /// Creates a role identifier from a stored value.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying storage value.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Role name, e.g. `admin`. Unique ignoring case, since role checks compare
/// names case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoleName(String);

impl RoleName {
    /// Maximum length of a role name.
    pub const MAX_LENGTH: usize = 64;

    /// Creates a validated role name.
    ///
    /// Commas and quote characters are rejected because role lists are
    /// parsed from comma-separated, optionally quoted strings.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = NonEmptyString::new(value)?;
        let value = value.as_str();

        if value.chars().count() > Self::MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "role name must not exceed {} characters",
                Self::MAX_LENGTH
            )));
        }

        if value.contains([',', '\'', '"']) {
            return Err(AppError::Validation(format!(
                "role name '{value}' must not contain commas or quotes"
            )));
        }

        Ok(Self(value.to_owned()))
    }

    /// Returns the role name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns whether both names refer to the same role.
    #[must_use]
    pub fn eq_ignore_case(&self, other: &RoleName) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }
}

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.0
    }
}

/// Role entity. Permissions and members are associations held in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    name: RoleName,
    display_name: Option<String>,
    description: Option<String>,
}

impl Role {
    /// Creates a role entity.
    #[must_use]
    pub fn new(
        id: RoleId,
        name: RoleName,
        display_name: Option<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            id,
            name,
            display_name,
            description,
        }
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the unique role name.
    #[must_use]
    pub fn name(&self) -> &RoleName {
        &self.name
    }

    /// Returns the optional display label.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::RoleName;
    use crate::RoleSpec;

    #[test]
    fn role_name_keeps_case() {
        let name = RoleName::new("Editor").unwrap_or_else(|_| unreachable!());
        assert_eq!(name.as_str(), "Editor");
    }

    #[test]
    fn case_variants_match_the_same_role_spec() {
        let stored = RoleName::new("admin").unwrap_or_else(|_| unreachable!());
        let variant = RoleName::new("ADMIN").unwrap_or_else(|_| unreachable!());
        let spec = RoleSpec::parse("admin");

        assert!(spec.matches(Some(stored.as_str())));
        assert!(spec.matches(Some(variant.as_str())));
        assert!(stored.eq_ignore_case(&variant));
    }

    #[test]
    fn role_name_rejects_list_separators() {
        assert!(RoleName::new("admin,user").is_err());
        assert!(RoleName::new("'admin'").is_err());
    }
}
