use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post, put};
use gatehouse_core::AppError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;

use crate::middleware::RequiredRoles;
use crate::state::AppState;
use crate::{auth, handlers, middleware};

/// Roles allowed into the administration API.
const MEMBER_ROLES: &str = "admin,user";
/// Role required for cache maintenance and diagnostics.
const ADMIN_ROLE: &str = "admin";

pub fn build_router(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<PostgresStore>,
) -> Result<Router, AppError> {
    let member_routes = Router::new()
        .route(
            "/api/authorization/check",
            get(handlers::authorization::authorization_check_handler),
        )
        .route(
            "/api/roles",
            get(handlers::security::list_roles_handler)
                .post(handlers::security::create_role_handler),
        )
        .route(
            "/api/roles/{role_id}",
            put(handlers::security::update_role_handler)
                .delete(handlers::security::delete_role_handler),
        )
        .route(
            "/api/roles/{role_id}/permissions",
            get(handlers::security::role_permission_editor_handler)
                .put(handlers::security::sync_role_permissions_handler),
        )
        .route(
            "/api/permissions",
            get(handlers::security::list_permissions_handler)
                .post(handlers::security::create_permission_handler),
        )
        .route(
            "/api/permissions/{permission_id}",
            put(handlers::security::update_permission_handler)
                .delete(handlers::security::delete_permission_handler),
        )
        .route(
            "/api/users",
            get(handlers::users::list_users_handler).post(handlers::users::create_user_handler),
        )
        .route(
            "/api/users/{user_id}",
            get(handlers::users::get_user_handler)
                .put(handlers::users::update_user_handler)
                .delete(handlers::users::delete_user_handler),
        )
        .route(
            "/api/users/{user_id}/role",
            post(handlers::security::change_role_handler),
        )
        .route(
            "/api/users/{user_id}/roles/{role_id}",
            post(handlers::security::assign_role_handler)
                .delete(handlers::security::remove_role_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_roles,
        ))
        .layer(axum::Extension(RequiredRoles::parse(MEMBER_ROLES)));

    let admin_routes = Router::new()
        .route(
            "/api/cache/permissions/clear",
            post(handlers::security::clear_permission_cache_handler),
        )
        .route(
            "/api/cache/permissions/refresh",
            post(handlers::security::refresh_permission_cache_handler),
        )
        .route(
            "/api/cache/permissions/metrics",
            get(handlers::security::permission_cache_metrics_handler),
        )
        .route(
            "/api/users/{user_id}/authorization-debug",
            get(handlers::security::authorization_debug_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_roles,
        ))
        .layer(axum::Extension(RequiredRoles::parse(ADMIN_ROLE)));

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .merge(member_routes)
        .merge(admin_routes)
        .route_layer(from_fn(middleware::require_auth));

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]);

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state))
}
