// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Telegram Mini App storefront API server.

use std::sync::Arc;
use tg_storefront::{
    config::{Config, StoreBackend},
    db::{FirestoreDb, MemoryOrderStore, OrderStore},
    telegram::MockBypass,
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        environment = ?config.environment,
        "Starting storefront API"
    );

    if config.bot_token.is_empty() {
        tracing::error!("BOT_TOKEN is not set: all Telegram authentication will be rejected");
    }
    if MockBypass::for_environment(config.environment).is_enabled() {
        tracing::warn!("DEV MODE: mock Telegram init data (hash=mock) will be accepted");
    }
    if config.admin_password.is_empty() {
        tracing::warn!("ADMIN_PASSWORD is not set: admin login is disabled");
    }

    let store: Arc<dyn OrderStore> = match config.store_backend {
        StoreBackend::Firestore => Arc::new(FirestoreDb::new(&config.gcp_project_id).await?),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory order store; orders are lost on restart");
            Arc::new(MemoryOrderStore::new())
        }
    };

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), store));

    // Build router
    let app = tg_storefront::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tg_storefront=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
