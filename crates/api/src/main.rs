//! HTTP API for the credit-metered chat platform.
//!
//! Proxies chat requests to OpenRouter, charges token usage against each
//! user's credit balance and stores chat sessions and agent task records.

mod auth;
mod config;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use completion_core::CachedCatalog;
use database::{user, Database, NewUser};
use openrouter_client::{OpenRouterClient, OpenRouterConfig};
use orchestrator::Orchestrator;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::auth::TokenIssuer;
use crate::config::{AdminAccount, Config};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    let openrouter_config = OpenRouterConfig::from_env()?;
    info!(addr = %config.addr, "Starting API server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    if let Some(admin) = &config.admin {
        bootstrap_admin(&db, admin).await?;
    }

    // Upstream client, shared by the catalog and the orchestrator
    let client = OpenRouterClient::new(openrouter_config)?;
    let default_model = client.config().default_model.clone();
    let catalog = CachedCatalog::new(client.clone(), client.config().models_cache_ttl);
    let orchestrator = Orchestrator::new(db.clone(), Arc::new(client), default_model);

    // Build application state
    let state = AppState::new(
        db.clone(),
        orchestrator,
        Arc::new(catalog),
        TokenIssuer::new(&config.jwt_secret, config.jwt_expire_hours),
        config.new_user_credits,
    );

    let app = routes::app(state, &config.cors_origins);

    // Start server
    info!(addr = %config.addr, "API server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("API server stopped");
    Ok(())
}

/// Create or promote the configured administrator.
async fn bootstrap_admin(db: &Database, admin: &AdminAccount) -> Result<(), Box<dyn std::error::Error>> {
    let password_hash = auth::hash_password_blocking(admin.password.clone()).await?;
    let account = NewUser::new(&admin.username, &admin.email, password_hash, 0);

    let ensured = user::ensure_admin(db.pool(), &account).await?;
    info!(user_id = %ensured.id, username = %ensured.username, "Admin account ready");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
