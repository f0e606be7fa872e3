//! Snagboard - Application Entry Point
//!
//! This is the main entry point for the Snagboard server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use snagboard::{
    config::{StoreBackend, CONFIG},
    constants::API_BASE_PATH,
    handlers, mirror,
    state::AppState,
    store::{DataStore, MemoryStore, PostgresStore, SeasonDefaults},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| CONFIG.server.rust_log.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Snagboard server...");

    // Select the persistence backend
    let defaults = SeasonDefaults::from_config(&CONFIG.season);
    let store: Arc<dyn DataStore> = match CONFIG.store.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, state is lost on shutdown");
            Arc::new(MemoryStore::new(defaults))
        }
        StoreBackend::Postgres => {
            let url = CONFIG
                .store
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for the postgres backend"))?;

            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(CONFIG.store.max_connections)
                .connect(url)
                .await?;

            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;

            Arc::new(PostgresStore::new(pool, defaults))
        }
    };

    // Start the mirror worker when an endpoint is configured
    let mirror = match &CONFIG.mirror.url {
        Some(url) => {
            tracing::info!(url = %url, "Spreadsheet mirror enabled");
            mirror::spawn(url.clone())
        }
        None => {
            tracing::info!("Spreadsheet mirror disabled");
            mirror::MirrorHandle::disabled()
        }
    };

    // Create application state
    let state = AppState::new(store, mirror, CONFIG.clone());

    // Build the router
    let app = Router::new()
        .nest(API_BASE_PATH, handlers::routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start the server
    let addr = SocketAddr::new(CONFIG.server.host.parse()?, CONFIG.server.port);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
