//! Recipes API - recipe catalogue over HTTP
//!
//! Public reads go through a cache-aside layer; writes require a short-lived
//! session token and invalidate the cached listing.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `database` - MongoDB integration (recipes and credentials)
//! - `cache` - Cache stores (Moka in-process or Redis)
//! - `recipes` - Cache-aside read coordinator and write invalidation
//! - `auth` - Credentials, session tokens and the access gate
//! - `http` - Axum routes
//! - `utils` - Utility functions

mod auth;
mod cache;
mod config;
mod database;
mod error;
mod http;
mod recipes;
mod utils;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use auth::{AccessGate, AuthService, SystemClock, TokenManager};
use cache::CacheConfig;
use config::Config;
use database::{CredentialRepository, Database, RecipeRepository};
use recipes::RecipeService;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("recipes_api=info,mongodb=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    let config = Config::from_env()?;
    info!("Configuration loaded successfully");

    // Connect to MongoDB
    info!("Connecting to MongoDB...");
    let db = Database::connect(&config.mongodb_uri, &config.mongodb_database).await?;
    db.ensure_indexes().await?;
    info!("Database connected");

    let credentials = Arc::new(CredentialRepository::new(&db));

    // `recipes-api seed-users alice:secret bob:hunter2`
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("seed-users") {
        let users = database::seed::parse_pairs(&args[1..])?;
        let inserted = database::seed::seed_users(credentials.as_ref(), &users).await?;
        info!("Seeded {} of {} users", inserted, users.len());
        return Ok(());
    }

    let cache_store = cache::connect(&CacheConfig::from_app(&config)).await;
    info!("Cache store ready");

    let tokens = Arc::new(TokenManager::new(
        &config.jwt_secret,
        config.token_policy,
        Arc::new(SystemClock),
    ));

    let recipes = Arc::new(RecipeService::new(
        Arc::new(RecipeRepository::new(&db)),
        cache_store,
        config.cache_error_policy,
        config.store_timeout,
    ));
    let auth = Arc::new(AuthService::new(credentials, tokens.clone(), config.store_timeout));

    if config.api_key.is_some() {
        info!("X-API-KEY required on write routes");
    }
    let gate = AccessGate::new(tokens, config.api_key.clone());

    let app = http::router(http::AppState { recipes, auth, gate });

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!("Listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
