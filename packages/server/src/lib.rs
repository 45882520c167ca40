//! NodeTree HTTP server
//!
//! REST API over [`NodeService`]. Handlers validate input, call the service
//! and map its errors onto [`HttpError`] responses; all tree logic lives in
//! `nodetree-core`.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin nodetree-server
//!
//! # Throwaway in-memory store on another port
//! NODETREE_IN_MEMORY=1 PORT=5001 cargo run --bin nodetree-server
//! ```

use axum::{
    http::{header, Method},
    Router,
};
use nodetree_core::db::{DatabaseService, LibsqlStore, MemoryStore, NodeStore};
use nodetree_core::services::NodeService;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod config;
mod http_error;
mod node_endpoints;
pub mod validation;

pub use config::{ServerConfig, StoreBackend};
pub use http_error::HttpError;
pub use node_endpoints::{CreateNodeRequest, DeleteNodeResponse, RenameNodeRequest};

/// Application state shared across all endpoints
#[derive(Clone)]
pub struct AppState {
    pub node_service: Arc<NodeService>,
}

impl AppState {
    pub fn new(node_service: NodeService) -> Self {
        Self {
            node_service: Arc::new(node_service),
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .merge(node_endpoints::routes(state))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
}

/// CORS for the configured frontend origins
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(config.cors_origins.clone())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Open the record store selected by `config`
///
/// The database service is returned alongside the store when there is one, so
/// the caller can flush it on shutdown.
pub async fn open_store(
    config: &ServerConfig,
) -> anyhow::Result<(Arc<dyn NodeStore>, Option<Arc<DatabaseService>>)> {
    match &config.store {
        StoreBackend::InMemory => {
            tracing::warn!("Using in-memory store; data is lost on shutdown");
            Ok((Arc::new(MemoryStore::new()), None))
        }
        StoreBackend::Libsql { db_path } => {
            tracing::info!("Database: {}", db_path.display());
            let db = Arc::new(DatabaseService::new(db_path.clone()).await?);
            Ok((Arc::new(LibsqlStore::new(db.clone())), Some(db)))
        }
    }
}

/// Open the store and serve until ctrl-c
///
/// # Errors
///
/// Returns error if the store cannot be opened or the server fails to bind.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    let (store, database) = open_store(&config).await?;
    let state = AppState::new(NodeService::new(store));
    let app = create_router(state, &config);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("NodeTree server listening on http://{}", addr);
    for origin in &config.cors_origins {
        tracing::info!("CORS enabled for {:?}", origin);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = database {
        if let Err(e) = db.db_close().await {
            tracing::warn!("Failed to checkpoint database on shutdown: {}", e);
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
