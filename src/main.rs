//! Release Server - Main Entry Point

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use release_server_backend::{
    api,
    config::Config,
    db,
    error::{AppError, Result},
    storage::{filesystem::FilesystemStorage, memory::MemoryStorage, BlobStorage},
    store::{memory::MemoryStore, postgres::PostgresStore, ReleaseStore},
    telemetry,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    telemetry::init_tracing(&config.log_level);
    tracing::info!("Starting Release Server");

    // Select the release/artifact store backend
    let store: Arc<dyn ReleaseStore> = match config.store_backend.as_str() {
        "postgres" => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| AppError::Config("DATABASE_URL not set".into()))?;
            let pool = db::create_pool(database_url).await?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Database migrations complete");

            Arc::new(PostgresStore::new(pool))
        }
        "memory" => {
            tracing::info!("Using in-memory release store");
            Arc::new(MemoryStore::new())
        }
        other => {
            return Err(AppError::Config(format!(
                "Unknown STORE_BACKEND: {}",
                other
            )))
        }
    };

    // Select the blob storage backend
    let storage: Arc<dyn BlobStorage> = match config.storage_backend.as_str() {
        "filesystem" => {
            tracing::info!(path = %config.storage_path, "Using filesystem blob storage");
            Arc::new(FilesystemStorage::new(&config.storage_path))
        }
        "memory" => {
            tracing::info!("Using in-memory blob storage");
            Arc::new(MemoryStorage::new())
        }
        other => {
            return Err(AppError::Config(format!(
                "Unknown STORAGE_BACKEND: {}",
                other
            )))
        }
    };

    // Create application state
    let state = Arc::new(api::AppState::new(config.clone(), store, storage));

    // Build router
    let app = Router::new()
        .merge(api::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = config.bind_address.parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
