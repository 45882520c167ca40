//! Database Connection Management
//!
//! This module provides the database connection, schema initialization and
//! raw SQL operations for the libsql-backed record store.
//!
//! # Architecture
//!
//! - **Path-agnostic**: Accepts any valid PathBuf, creating parent directories
//! - **WAL mode**: Write-Ahead Logging for concurrent readers
//! - **Foreign keys**: `parent_id` must reference an existing row at write time
//! - **Idempotent schema**: `CREATE ... IF NOT EXISTS`, safe on every start
//!
//! # Connections
//!
//! Use `connect_with_timeout()` in async code. It configures a busy timeout and
//! foreign key enforcement on every new connection, so concurrent writers wait
//! instead of failing with `SQLITE_BUSY`.

use crate::db::StoreError;
use libsql::{Builder, Database, Value};
use std::path::PathBuf;
use std::sync::Arc;

/// Maximum number of ids bound into a single `DELETE ... IN (...)` statement.
///
/// Stays well below SQLite's host parameter limit.
const DELETE_CHUNK_SIZE: usize = 500;

/// `SQLITE_CONSTRAINT` primary result code
const SQLITE_CONSTRAINT: i32 = 19;

/// `SQLITE_CONSTRAINT_FOREIGNKEY` extended result code
const SQLITE_CONSTRAINT_FOREIGNKEY: i32 = 787;

/// Whether `err` is SQLite rejecting a write on a foreign key
fn is_foreign_key_violation(err: &libsql::Error) -> bool {
    match err {
        libsql::Error::SqliteFailure(code, message) => {
            *code == SQLITE_CONSTRAINT_FOREIGNKEY
                || ((*code & 0xff) == SQLITE_CONSTRAINT && message.contains("FOREIGN KEY"))
        }
        other => other.to_string().contains("FOREIGN KEY constraint failed"),
    }
}

/// Database service for managing the libsql connection and schema
///
/// # Examples
///
/// ```no_run
/// use nodetree_core::db::DatabaseService;
/// use std::path::PathBuf;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let db_path = PathBuf::from("/path/to/nodetree.db");
///     let db_service = DatabaseService::new(db_path).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseService {
    /// libsql database handle (wrapped in Arc for sharing)
    pub db: Arc<Database>,

    /// Path to the database file
    pub db_path: PathBuf,
}

/// Parameters for node insertion
pub struct DbInsertNodeParams<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub parent_id: Option<&'a str>,
    pub created_at: &'a str,
}

impl DatabaseService {
    /// Create a new DatabaseService with the specified database path
    ///
    /// This will:
    /// 1. Ensure the parent directory exists (create if needed)
    /// 2. Open/create the database file
    /// 3. Initialize the schema
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the directory cannot be created, the database
    /// cannot be opened, or schema initialization fails.
    pub async fn new(db_path: PathBuf) -> Result<Self, StoreError> {
        let is_new_database = !db_path.exists();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| StoreError::connection_failed(db_path.clone(), e))?;

        let service = Self {
            db: Arc::new(db),
            db_path,
        };

        service.initialize_schema(is_new_database).await?;

        tracing::info!("Database ready at {}", service.db_path.display());

        Ok(service)
    }

    /// Execute a PRAGMA statement
    ///
    /// PRAGMA statements may return rows, so they go through query() instead of execute().
    async fn execute_pragma(conn: &libsql::Connection, pragma: &str) -> Result<(), StoreError> {
        let mut stmt = conn.prepare(pragma).await.map_err(|e| {
            StoreError::unavailable(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        let _ = stmt.query(()).await.map_err(|e| {
            StoreError::unavailable(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        Ok(())
    }

    /// Initialize database schema and configuration
    ///
    /// # Schema
    ///
    /// - `nodes` table: one row per record, `parent_id` referencing `nodes(id)`
    /// - `idx_nodes_parent`: child lookups used by the deletion planner
    async fn initialize_schema(&self, is_new_database: bool) -> Result<(), StoreError> {
        let conn = self.connect_with_timeout().await?;

        Self::execute_pragma(&conn, "PRAGMA journal_mode = WAL").await?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS nodes (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                parent_id TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (parent_id) REFERENCES nodes(id)
            )",
            (),
        )
        .await
        .map_err(|e| {
            StoreError::initialization_failed(format!("Failed to create nodes table: {}", e))
        })?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_nodes_parent ON nodes(parent_id)",
            (),
        )
        .await
        .map_err(|e| {
            StoreError::initialization_failed(format!(
                "Failed to create index 'idx_nodes_parent': {}",
                e
            ))
        })?;

        // Flush the schema of a fresh file so a second handle sees the table
        if is_new_database {
            Self::execute_pragma(&conn, "PRAGMA wal_checkpoint(TRUNCATE)").await?;
        }

        Ok(())
    }

    /// Get a raw connection to the database
    ///
    /// Prefer `connect_with_timeout()` in async code.
    pub fn connect(&self) -> Result<libsql::Connection, StoreError> {
        self.db.connect().map_err(StoreError::Libsql)
    }

    /// Get a connection with busy timeout and foreign keys configured
    pub async fn connect_with_timeout(&self) -> Result<libsql::Connection, StoreError> {
        let conn = self.connect()?;
        Self::execute_pragma(&conn, "PRAGMA busy_timeout = 5000").await?;
        Self::execute_pragma(&conn, "PRAGMA foreign_keys = ON").await?;
        Ok(conn)
    }

    //
    // NODE OPERATIONS
    // Raw SQL wrapped by LibsqlStore, which owns row → record conversion.
    //

    /// Insert a node row
    pub async fn db_insert_node(&self, params: DbInsertNodeParams<'_>) -> Result<(), StoreError> {
        let conn = self.connect_with_timeout().await?;

        conn.execute(
            "INSERT INTO nodes (id, name, parent_id, created_at) VALUES (?, ?, ?, ?)",
            (params.id, params.name, params.parent_id, params.created_at),
        )
        .await
        .map_err(|e| match params.parent_id {
            // The parent can vanish between the caller's existence check and this insert
            Some(parent_id) if is_foreign_key_violation(&e) => StoreError::invalid_parent(parent_id),
            _ => StoreError::unavailable(format!("Failed to insert node: {}", e)),
        })?;

        Ok(())
    }

    /// Whether a row with `id` exists
    pub async fn db_node_exists(&self, id: &str) -> Result<bool, StoreError> {
        let conn = self.connect_with_timeout().await?;

        let mut rows = conn
            .query("SELECT 1 FROM nodes WHERE id = ?", [id])
            .await
            .map_err(|e| StoreError::unavailable(format!("Failed to check node: {}", e)))?;

        let row = rows
            .next()
            .await
            .map_err(|e| StoreError::unavailable(e.to_string()))?;

        Ok(row.is_some())
    }

    /// Retrieve a single node row by id
    ///
    /// Columns: id, name, parent_id, created_at
    pub async fn db_get_node(&self, id: &str) -> Result<Option<libsql::Row>, StoreError> {
        let conn = self.connect_with_timeout().await?;

        let mut rows = conn
            .query(
                "SELECT id, name, parent_id, created_at FROM nodes WHERE id = ?",
                [id],
            )
            .await
            .map_err(|e| {
                StoreError::unavailable(format!("Failed to execute get_node query: {}", e))
            })?;

        rows.next()
            .await
            .map_err(|e| StoreError::unavailable(e.to_string()))
    }

    /// Retrieve every node row in creation order
    ///
    /// Columns: id, name, parent_id, created_at
    pub async fn db_fetch_all(&self) -> Result<libsql::Rows, StoreError> {
        let conn = self.connect_with_timeout().await?;

        conn.query(
            "SELECT id, name, parent_id, created_at FROM nodes ORDER BY created_at ASC, rowid ASC",
            (),
        )
        .await
        .map_err(|e| StoreError::unavailable(format!("Failed to execute fetch_all query: {}", e)))
    }

    /// Retrieve the ids of the direct children of `parent_id`, in creation order
    pub async fn db_fetch_child_ids(&self, parent_id: &str) -> Result<Vec<String>, StoreError> {
        let conn = self.connect_with_timeout().await?;

        let mut rows = conn
            .query(
                "SELECT id FROM nodes WHERE parent_id = ? ORDER BY created_at ASC, rowid ASC",
                [parent_id],
            )
            .await
            .map_err(|e| {
                StoreError::unavailable(format!("Failed to execute fetch_children query: {}", e))
            })?;

        let mut ids = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| StoreError::unavailable(e.to_string()))?
        {
            let id: String = row
                .get(0)
                .map_err(|e| StoreError::corrupt_record(format!("Failed to get id: {}", e)))?;
            ids.push(id);
        }

        Ok(ids)
    }

    /// Update a node's name
    ///
    /// # Returns
    ///
    /// Number of rows affected (0 = node didn't exist)
    pub async fn db_update_name(&self, id: &str, name: &str) -> Result<u64, StoreError> {
        let conn = self.connect_with_timeout().await?;

        conn.execute("UPDATE nodes SET name = ? WHERE id = ?", (name, id))
            .await
            .map_err(|e| StoreError::unavailable(format!("Failed to update node: {}", e)))
    }

    /// Delete a set of node rows in a single transaction
    ///
    /// Foreign key checks are deferred to commit, so a closed subtree can be
    /// removed in any chunk order. If the set is not closed (a child was added
    /// concurrently), the commit fails and nothing is deleted.
    ///
    /// # Returns
    ///
    /// Number of rows deleted
    pub async fn db_delete_nodes(&self, ids: &[String]) -> Result<u64, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let conn = self.connect_with_timeout().await?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| StoreError::unavailable(format!("Failed to begin transaction: {}", e)))?;

        match Self::delete_in_chunks(&tx, ids).await {
            Ok(deleted) => {
                tx.commit().await.map_err(|e| {
                    StoreError::unavailable(format!("Failed to commit bulk delete: {}", e))
                })?;
                Ok(deleted)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!("Rollback after failed bulk delete failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    async fn delete_in_chunks(conn: &libsql::Connection, ids: &[String]) -> Result<u64, StoreError> {
        Self::execute_pragma(conn, "PRAGMA defer_foreign_keys = ON").await?;

        let mut deleted = 0;
        for chunk in ids.chunks(DELETE_CHUNK_SIZE) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!("DELETE FROM nodes WHERE id IN ({})", placeholders);
            let values: Vec<Value> = chunk.iter().map(|id| Value::Text(id.clone())).collect();

            deleted += conn
                .execute(&sql, libsql::params::Params::Positional(values))
                .await
                .map_err(|e| StoreError::unavailable(format!("Failed to delete nodes: {}", e)))?;
        }

        Ok(deleted)
    }

    /// Flush the WAL before shutdown
    pub async fn db_close(&self) -> Result<(), StoreError> {
        let conn = self.connect_with_timeout().await?;
        Self::execute_pragma(&conn, "PRAGMA wal_checkpoint(TRUNCATE)").await?;
        Ok(())
    }
}
