use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use gatehouse_application::DEFAULT_CACHE_TTL_MINUTES;
use gatehouse_core::AppError;
use tracing_subscriber::EnvFilter;

/// What the binary does after loading configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Serve,
    MigrateOnly,
    Seed,
}

/// Where permission cache entries live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionCacheBackend {
    InMemory,
    Redis,
}

impl PermissionCacheBackend {
    fn parse(value: &str) -> Result<Self, AppError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "in_memory" | "memory" => Ok(Self::InMemory),
            "redis" => Ok(Self::Redis),
            other => Err(AppError::Validation(format!(
                "PERMISSION_CACHE_BACKEND must be either 'in_memory' or 'redis', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub run_mode: RunMode,
    pub database_url: String,
    pub redis_url: Option<String>,
    pub frontend_url: String,
    pub _session_secret: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub permission_cache_backend: PermissionCacheBackend,
    pub permission_cache_ttl_minutes: u32,
    pub permission_cache_key_namespace: String,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let run_mode = match env::args().nth(1).as_deref() {
            Some("migrate") => RunMode::MigrateOnly,
            Some("seed") => RunMode::Seed,
            _ => RunMode::Serve,
        };

        let database_url = required_env("DATABASE_URL")?;
        let redis_url = optional_non_empty_env("REDIS_URL");
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let session_secret = required_env("SESSION_SECRET")?;
        if session_secret.len() < 32 {
            return Err(AppError::Validation(
                "SESSION_SECRET must be at least 32 characters".to_owned(),
            ));
        }

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);
        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");

        let permission_cache_backend = PermissionCacheBackend::parse(
            env::var("PERMISSION_CACHE_BACKEND")
                .unwrap_or_else(|_| "in_memory".to_owned())
                .as_str(),
        )?;
        if permission_cache_backend == PermissionCacheBackend::Redis && redis_url.is_none() {
            return Err(AppError::Validation(
                "REDIS_URL is required when PERMISSION_CACHE_BACKEND=redis".to_owned(),
            ));
        }

        let permission_cache_ttl_minutes = match optional_non_empty_env(
            "PERMISSION_CACHE_TTL_MINUTES",
        ) {
            Some(value) => value.trim().parse::<u32>().map_err(|error| {
                AppError::Validation(format!("invalid PERMISSION_CACHE_TTL_MINUTES: {error}"))
            })?,
            None => DEFAULT_CACHE_TTL_MINUTES,
        };
        let permission_cache_key_namespace = env::var("PERMISSION_CACHE_KEY_NAMESPACE")
            .map(|value| value.trim().to_owned())
            .unwrap_or_default();

        Ok(Self {
            run_mode,
            database_url,
            redis_url,
            frontend_url,
            _session_secret: session_secret,
            api_host,
            api_port,
            cookie_secure,
            permission_cache_backend,
            permission_cache_ttl_minutes,
            permission_cache_key_namespace,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn optional_non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
