//! Blog Server Library
//!
//! REST backend for a small blog: account registration and login with JWTs,
//! post CRUD with view counting, and image uploads served from disk.

pub mod auth;
pub mod config;
pub mod ctx;
pub mod db;
pub mod error;
pub mod models;
pub mod posts;
pub mod router;
pub mod uploads;
pub mod validation;

use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use auth::token::TokenKeys;
use auth::AuthManager;
use config::{AppState, ServerConfig};
use posts::PostManager;

/// Open the database and assemble the shared handler state
pub async fn build_state(config: ServerConfig) -> anyhow::Result<AppState> {
    config.ensure_dirs().await?;

    let pool = db::connect(&config.database_url).await?;
    let keys = TokenKeys::new(config.jwt_secret.as_bytes(), config.token_ttl_days);

    Ok(AppState {
        auth: Arc::new(AuthManager::new(pool.clone(), config.bcrypt_cost)),
        posts: Arc::new(PostManager::new(pool)),
        keys: Arc::new(keys),
        config: Arc::new(config),
    })
}

pub async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Already set, ignore
    }

    info!("=== Blog Server ===");

    let config = ServerConfig::from_env();
    info!("Uploads directory: {:?}", config.uploads_dir);
    if config.uses_default_secret() {
        warn!("JWT_SECRET is not set; signing tokens with the built-in default secret");
    }

    let addr = config.addr();
    let state = build_state(config).await?;
    let app = router::router(state);

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
