//! Server configuration
//!
//! Read once at startup from the process environment (after `dotenvy` has
//! loaded any `.env` file).
//!
//! # Environment Variables
//!
//! - `PORT`: Server port (default: 5000)
//! - `BIND_ADDRESS`: Interface to bind (default: 127.0.0.1)
//! - `DATABASE_PATH`: libsql database file (default: ~/.nodetree/database/nodetree.db)
//! - `NODETREE_IN_MEMORY`: `1` or `true` selects the in-memory store
//! - `FRONTEND_URL`: Extra CORS origin, added to http://localhost:3000

use anyhow::{anyhow, Context};
use axum::http::HeaderValue;
use std::net::IpAddr;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:3000";

/// Which record store the server runs on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Libsql { db_path: PathBuf },
    InMemory,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: IpAddr,
    pub port: u16,
    pub store: StoreBackend,
    pub cors_origins: Vec<HeaderValue>,
}

impl ServerConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns the value of a
    /// variable if set
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT: {}", raw))?,
            None => DEFAULT_PORT,
        };

        let bind_address = match lookup("BIND_ADDRESS") {
            Some(raw) => raw
                .trim()
                .parse::<IpAddr>()
                .with_context(|| format!("Invalid BIND_ADDRESS: {}", raw))?,
            None => IpAddr::from([127, 0, 0, 1]),
        };

        let in_memory = lookup("NODETREE_IN_MEMORY")
            .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes"))
            .unwrap_or(false);

        let store = if in_memory {
            StoreBackend::InMemory
        } else {
            let db_path = match lookup("DATABASE_PATH") {
                Some(path) if !path.trim().is_empty() => PathBuf::from(path.trim()),
                _ => default_db_path()?,
            };
            StoreBackend::Libsql { db_path }
        };

        let mut cors_origins = vec![HeaderValue::from_static(DEFAULT_FRONTEND_ORIGIN)];
        if let Some(frontend_url) = lookup("FRONTEND_URL") {
            let frontend_url = frontend_url.trim();
            if !frontend_url.is_empty() && frontend_url != DEFAULT_FRONTEND_ORIGIN {
                let origin = frontend_url
                    .parse::<HeaderValue>()
                    .map_err(|_| anyhow!("Invalid FRONTEND_URL - must be a valid HTTP origin"))?;
                cors_origins.push(origin);
            }
        }

        Ok(Self {
            bind_address,
            port,
            store,
            cors_origins,
        })
    }

    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::new(self.bind_address, self.port)
    }
}

/// Default: ~/.nodetree/database/nodetree.db
fn default_db_path() -> anyhow::Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Failed to get home directory"))?;
    Ok(home_dir
        .join(".nodetree")
        .join("database")
        .join("nodetree.db"))
}
