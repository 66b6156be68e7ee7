//! User records as seen by the RBAC administration screens.

use gatehouse_core::{AppError, AppResult, NonEmptyString, UserIdentity};
use serde::{Deserialize, Serialize};

/// Unique identifier for a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(i64);

impl UserId {
    /// Creates a user identifier from a stored value.
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

impl From<&UserIdentity> for UserId {
    fn from(identity: &UserIdentity) -> Self {
        Self(identity.user_id())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Login email, stored lower-cased so lookups ignore case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    const MAX_LENGTH: usize = 254;

    /// Lower-cases and checks the `local@domain.tld` shape.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into().trim().to_lowercase();

        let well_formed = value.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() > 1
                && domain.split('.').all(|label| !label.is_empty())
        });
        if !well_formed {
            return Err(AppError::Validation(format!(
                "'{value}' is not a valid login email"
            )));
        }

        if value.len() > Self::MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "login email must not exceed {} characters",
                Self::MAX_LENGTH
            )));
        }

        Ok(Self(value))
    }

    /// Returns the lower-cased address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// User entity. Credentials stay in storage and never enter the domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    name: String,
    email: EmailAddress,
}

impl User {
    /// Creates a user entity with a validated display name.
    pub fn new(id: UserId, name: impl Into<String>, email: EmailAddress) -> AppResult<Self> {
        let name = NonEmptyString::new(name)?;
        Ok(Self {
            id,
            name: name.into(),
            email,
        })
    }

    /// Returns the user identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the canonical email address.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }
}

/// Shortest accepted login password.
pub const PASSWORD_MIN_LENGTH: usize = 10;

/// Longest accepted login password. Caps the input handed to the hasher.
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Checks a new login password before it is hashed.
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.trim().is_empty() {
        return Err(AppError::Validation("password must not be blank".to_owned()));
    }

    let length = password.chars().count();
    if !(PASSWORD_MIN_LENGTH..=PASSWORD_MAX_LENGTH).contains(&length) {
        return Err(AppError::Validation(format!(
            "password must be between {PASSWORD_MIN_LENGTH} and {PASSWORD_MAX_LENGTH} characters"
        )));
    }

    Ok(())
}
