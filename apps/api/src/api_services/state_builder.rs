use std::sync::Arc;

use gatehouse_application::{
    AuthorizationService, CacheStore, PermissionCacheService, SecurityAdminService, UserService,
};
use gatehouse_core::AppError;
use gatehouse_infrastructure::{
    Argon2PasswordHasher, InMemoryCacheStore, PostgresAuditRepository,
    PostgresAuthorizationRepository, PostgresRoleRepository, PostgresUserRepository,
    RedisCacheStore,
};
use sqlx::PgPool;
use tracing::info;

use crate::api_config::{ApiConfig, PermissionCacheBackend};
use crate::state::AppState;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let redis_client = config
        .redis_url
        .as_deref()
        .map(|redis_url| {
            redis::Client::open(redis_url)
                .map_err(|error| AppError::Validation(format!("invalid REDIS_URL: {error}")))
        })
        .transpose()?;

    let cache_store = build_cache_store(config, redis_client.clone())?;
    let permission_cache = PermissionCacheService::new(
        cache_store,
        Arc::new(PostgresAuthorizationRepository::new(pool.clone())),
    )
    .with_ttl_minutes(config.permission_cache_ttl_minutes);

    let authorization_service = AuthorizationService::new(permission_cache);
    let audit_repository = Arc::new(PostgresAuditRepository::new(pool.clone()));

    let security_admin_service = SecurityAdminService::new(
        authorization_service.clone(),
        Arc::new(PostgresRoleRepository::new(pool.clone())),
        audit_repository.clone(),
    );
    let user_service = UserService::new(
        authorization_service.clone(),
        Arc::new(PostgresUserRepository::new(pool.clone())),
        Arc::new(Argon2PasswordHasher::new()),
        audit_repository,
    );

    Ok(AppState {
        authorization_service,
        security_admin_service,
        user_service,
        postgres_pool: pool,
        redis_client,
        frontend_url: config.frontend_url.clone(),
    })
}

fn build_cache_store(
    config: &ApiConfig,
    redis_client: Option<redis::Client>,
) -> Result<Arc<dyn CacheStore>, AppError> {
    match config.permission_cache_backend {
        PermissionCacheBackend::InMemory => {
            info!("permission cache backed by process memory");
            Ok(Arc::new(InMemoryCacheStore::new()))
        }
        PermissionCacheBackend::Redis => {
            let redis_client = redis_client.ok_or_else(|| {
                AppError::Validation(
                    "REDIS_URL is required when PERMISSION_CACHE_BACKEND=redis".to_owned(),
                )
            })?;
            info!(
                namespace = %config.permission_cache_key_namespace,
                "permission cache backed by redis"
            );
            Ok(Arc::new(RedisCacheStore::new(
                redis_client,
                config.permission_cache_key_namespace.clone(),
            )))
        }
    }
}
