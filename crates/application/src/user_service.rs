//! User management ports and application service.
//!
//! Owns the user lifecycle and password authentication. Lifecycle writes
//! bump the permission cache generation and leave an audit record.

use std::sync::Arc;

use async_trait::async_trait;

use gatehouse_core::AppResult;
use gatehouse_domain::{EmailAddress, User, UserId};

use crate::{AuditRepository, AuthorizationService, PermissionCacheService};

mod lifecycle;
mod login;

#[cfg(test)]
mod tests;

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Stored user together with its password hash.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    /// User entity.
    pub user: User,
    /// Argon2id password hash.
    pub password_hash: String,
}

/// Storage payload for a new user.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Display name.
    pub name: String,
    /// Canonical email address.
    pub email: EmailAddress,
    /// Argon2id password hash.
    pub password_hash: String,
}

/// Storage payload for a user update.
#[derive(Debug, Clone)]
pub struct UpdateUserInput {
    /// Display name.
    pub name: String,
    /// Canonical email address.
    pub email: EmailAddress,
    /// Replacement password hash, if the password changes.
    pub password_hash: Option<String>,
}

/// Repository port for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Lists users ordered by id.
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Finds a user by id.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>>;

    /// Finds a user and password hash by email (case-insensitive).
    async fn find_credentials_by_email(&self, email: &str) -> AppResult<Option<UserCredentials>>;

    /// Creates a user. Duplicate emails are a conflict.
    async fn create_user(&self, input: CreateUserInput) -> AppResult<User>;

    /// Updates a user.
    async fn update_user(&self, user_id: UserId, input: UpdateUserInput) -> AppResult<User>;

    /// Deletes a user and its role associations.
    async fn delete_user(&self, user_id: UserId) -> AppResult<()>;
}

/// Port for password hashing operations. Keeps domain/application free of
/// direct cryptographic library coupling.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password using Argon2id.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

// ---------------------------------------------------------------------------
// Request and outcome types
// ---------------------------------------------------------------------------

/// Result of a login attempt.
#[derive(Debug)]
pub enum AuthOutcome {
    /// Authentication succeeded. Session can be established.
    Authenticated(User),
    /// Authentication failed. Generic message prevents enumeration.
    Failed,
}

/// Parameters for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserParams {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Parameters for updating a user.
#[derive(Debug, Clone)]
pub struct UpdateUserParams {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// New plaintext password, if it changes.
    pub password: Option<String>,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Application service for user lifecycle and authentication.
#[derive(Clone)]
pub struct UserService {
    authorization_service: AuthorizationService,
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    audit_repository: Arc<dyn AuditRepository>,
    permission_cache: PermissionCacheService,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        let permission_cache = authorization_service.permission_cache().clone();
        Self {
            authorization_service,
            user_repository,
            password_hasher,
            audit_repository,
            permission_cache,
        }
    }
}
