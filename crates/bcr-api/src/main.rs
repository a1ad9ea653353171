//! # bcr-api: Binary Entry Point
//!
//! Starts the Axum HTTP server for the registry API.

use bcr_api::config::{AppConfig, LogFormat};
use bcr_content::{ContentStoreClient, ContentStoreConfig};
use bcr_crypto::SecretHasher;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(?config, "configuration loaded");

    let content = ContentStoreClient::new(ContentStoreConfig::from_env()?).map_err(|e| {
        tracing::error!("Failed to create content store client: {e}");
        e
    })?;

    // Initialize database pool (optional; absent means in-memory only).
    let db_pool = bcr_api::db::init_pool(config.database_url.as_deref().map(String::as_str))
        .await
        .map_err(|e| {
            tracing::error!("Database initialization failed: {e}");
            e
        })?;

    let port = config.port;
    let state =
        bcr_api::state::AppState::try_with_config(config, SecretHasher::default(), content, db_pool)
            .map_err(|e| {
                tracing::error!("State initialization failed: {e}");
                e
            })?;

    // Hydrate in-memory stores from database (if connected).
    state.hydrate_from_db().await.map_err(|e| {
        tracing::error!("Database hydration failed: {e}");
        e
    })?;

    let app = bcr_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Registry API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
