//! NodeTree Server Binary
//!
//! # Environment Variables
//!
//! See [`nodetree_server::config`]. A `.env` file in the working directory is
//! loaded first if present.
//!
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")

use nodetree_server::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("NodeTree server v{}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::from_env()?;
    tracing::info!("Port: {}", config.port);

    start_server(config).await
}
