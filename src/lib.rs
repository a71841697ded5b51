// src/lib.rs
pub mod auth;
pub mod config;
pub mod costing;
pub mod database;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod reports;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use axum::{http::HeaderValue, routing::get, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, EnvFilter};

use crate::auth::jwt::JwtKeys;
use crate::config::{AppConfig, ConfigError};
use crate::state::AppState;

/// Anything that stops the server from starting or keeps it from serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to create database pool: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to run migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("failed to bind to any port starting at {port} on {host}")]
    Bind { host: std::net::IpAddr, port: u16 },
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Log level comes from `RUST_LOG`, default `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).with_line_number(true).init();
}

/// An empty origin list allows any origin.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// The full application: `/health` plus the API nested under `/api`.
pub fn build_app(state: AppState, allowed_origins: &[String]) -> Router {
    let api = routes::create_router(&state);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .with_state(state)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// Connect, migrate, bind and serve until the server stops.
pub async fn run(config: AppConfig) -> Result<(), StartupError> {
    let db_pool = database::create_pool(&config.database_url, config.database_max_connections).await?;
    database::run_migrations(&db_pool).await?;

    let jwt = JwtKeys::new(&config.jwt_secret, config.token_ttl_hours);
    let app = build_app(AppState::new(db_pool, jwt), &config.cors_allowed_origins);

    // Try port..port+20 to avoid crash when address is in use
    let mut bound = None;
    for offset in 0u16..=20 {
        let port = config.port.saturating_add(offset);
        let addr = SocketAddr::from((config.host, port));
        match TcpListener::bind(addr).await {
            Ok(l) => {
                bound = Some((l, addr));
                break;
            }
            Err(e) => {
                if offset == 0 {
                    tracing::warn!(%addr, error = %e, "Port in use, trying next");
                }
            }
        }
    }
    let (listener, addr) = bound.ok_or(StartupError::Bind {
        host: config.host,
        port: config.port,
    })?;
    tracing::info!("Server running on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
