use gatehouse_application::{AuthorizationService, SecurityAdminService, UserService};
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationService,
    pub security_admin_service: SecurityAdminService,
    pub user_service: UserService,
    pub postgres_pool: PgPool,
    pub redis_client: Option<redis::Client>,
    pub frontend_url: String,
}
