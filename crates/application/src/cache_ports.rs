use async_trait::async_trait;
use gatehouse_core::AppResult;
use gatehouse_domain::UserId;

/// Cache key holding the permissions generation counter.
pub const PERMISSIONS_VERSION_KEY: &str = "permissions_version";

/// Cache key holding the serialized global role snapshot.
pub const GLOBAL_ROLES_PERMISSIONS_KEY: &str = "global_roles_permissions";

/// Prefix of per-user resolution keys.
pub const USER_ROLES_PERMISSIONS_PREFIX: &str = "user_roles_permissions_";

/// Builds the per-user resolution key for one cache generation.
///
/// Keys embed the generation, so entries written under an older generation
/// are never read again once the counter moves on.
#[must_use]
pub fn user_cache_key(user_id: UserId, version: u64) -> String {
    format!("{USER_ROLES_PERMISSIONS_PREFIX}{user_id}_{version}")
}

/// Key-value cache port used by the permission cache.
///
/// Values are opaque strings. Implementations must make `increment` atomic:
/// it creates the key at 1 when absent, otherwise adds one.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the stored value, if present and not expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Stores a value with a time-to-live in minutes.
    async fn set(&self, key: &str, value: &str, ttl_minutes: u32) -> AppResult<()>;

    /// Removes a value. Missing keys are not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Returns whether a live value exists for the key.
    async fn has(&self, key: &str) -> AppResult<bool>;

    /// Atomically increments an integer counter and returns the new value.
    async fn increment(&self, key: &str) -> AppResult<i64>;
}

#[cfg(test)]
mod tests {
    use gatehouse_domain::UserId;

    use super::user_cache_key;

    #[test]
    fn user_key_embeds_user_and_generation() {
        assert_eq!(
            user_cache_key(UserId::new(42), 7),
            "user_roles_permissions_42_7"
        );
    }
}
