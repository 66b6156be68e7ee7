use gatehouse_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Unique identifier for a permission record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PermissionId(i64);

impl PermissionId {
    /// Creates a permission identifier from a stored value.
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

impl std::fmt::Display for PermissionId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Machine key of a permission, e.g. `user_create`.
///
/// Permission checks compare these keys exactly, so the allowed alphabet is
/// restricted to lower-case ASCII letters, digits, `_` and `.`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PermissionName(String);

impl PermissionName {
    /// Maximum length of a permission key.
    pub const MAX_LENGTH: usize = 100;

    /// Creates a validated permission key.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = NonEmptyString::new(value)?;
        let value = value.as_str();

        if value.len() > Self::MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "permission name must not exceed {} characters",
                Self::MAX_LENGTH
            )));
        }

        if !value
            .chars()
            .all(|character| matches!(character, 'a'..='z' | '0'..='9' | '_' | '.'))
        {
            return Err(AppError::Validation(format!(
                "permission name '{value}' may only contain lower-case letters, digits, '_' and '.'"
            )));
        }

        Ok(Self(value.to_owned()))
    }

    /// Returns the permission key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PermissionName> for String {
    fn from(value: PermissionName) -> Self {
        value.0
    }
}

/// Permission entity: a named capability grouped under a module label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    id: PermissionId,
    name: PermissionName,
    module: String,
    display_name: String,
}

impl Permission {
    /// Creates a permission entity.
    #[must_use]
    pub fn new(
        id: PermissionId,
        name: PermissionName,
        module: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name,
            module: module.into(),
            display_name: display_name.into(),
        }
    }

    /// Returns the permission identifier.
    #[must_use]
    pub fn id(&self) -> PermissionId {
        self.id
    }

    /// Returns the machine key.
    #[must_use]
    pub fn name(&self) -> &PermissionName {
        &self.name
    }

    /// Returns the grouping label.
    #[must_use]
    pub fn module(&self) -> &str {
        self.module.as_str()
    }

    /// Returns the human-readable label.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::PermissionName;

    #[test]
    fn machine_keys_are_accepted() {
        assert!(PermissionName::new("user_create").is_ok());
        assert!(PermissionName::new("reports.export").is_ok());
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let name = PermissionName::new(" role_view ").unwrap_or_else(|_| unreachable!());
        assert_eq!(name.as_str(), "role_view");
    }

    #[test]
    fn upper_case_and_spaces_are_rejected() {
        assert!(PermissionName::new("User_Create").is_err());
        assert!(PermissionName::new("user create").is_err());
        assert!(PermissionName::new("").is_err());
    }
}
