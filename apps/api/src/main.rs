//! Gatehouse API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod auth;
mod dev_seed;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use gatehouse_core::AppError;
use tracing::info;

use crate::api_config::{ApiConfig, RunMode, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let pool = api_services::connect_and_migrate(&config.database_url).await?;

    match config.run_mode {
        RunMode::MigrateOnly => {
            info!("database migrations applied successfully");
            return Ok(());
        }
        RunMode::Seed => return dev_seed::run(pool, &config).await,
        RunMode::Serve => {}
    }

    let session_layer = api_services::build_session_layer(pool.clone(), &config).await?;
    let app_state = api_services::build_app_state(pool, &config)?;
    let app = api_router::build_router(app_state, &config.frontend_url, session_layer)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "gatehouse-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
