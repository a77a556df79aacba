// src/main.rs
use dotenv::dotenv;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use minerva_api::auth::{SqliteUserStore, TokenService};
use minerva_api::common::{db, AppState, Config};

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let config = Config::from_env();
    info!(
        port = config.port,
        database_url = %config.database_url,
        bcrypt_cost = config.bcrypt_cost,
        "Configuration loaded"
    );

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    let pool = db::connect(&config.database_url).await?;

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let state = Arc::new(AppState::new(
        Arc::new(SqliteUserStore::new(pool)),
        TokenService::new(&config.jwt_secret),
        config.bcrypt_cost,
    ));

    let app = minerva_api::build_app(state, config.cors_origins.as_deref());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Minerva backend listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
