//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod in_memory_cache_store;
mod postgres_audit_repository;
mod postgres_authorization_repository;
mod postgres_role_repository;
mod postgres_user_repository;
mod redis_cache_store;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use in_memory_cache_store::InMemoryCacheStore;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_authorization_repository::PostgresAuthorizationRepository;
pub use postgres_role_repository::PostgresRoleRepository;
pub use postgres_user_repository::PostgresUserRepository;
pub use redis_cache_store::RedisCacheStore;
