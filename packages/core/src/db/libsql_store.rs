//! LibsqlStore - NodeStore Implementation for the libsql Backend
//!
//! Thin wrapper around [`DatabaseService`]: every method delegates to a `db_*`
//! operation and converts `libsql::Row` values into [`NodeRecord`]s.

use crate::db::database::DbInsertNodeParams;
use crate::db::node_store::NodeStore;
use crate::db::{DatabaseService, StoreError};
use crate::models::NodeRecord;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use libsql::Row;
use std::sync::Arc;

/// NodeStore backed by an embedded libsql database
pub struct LibsqlStore {
    db: Arc<DatabaseService>,
}

impl LibsqlStore {
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    /// Format a timestamp for storage
    ///
    /// Fixed-width RFC3339 with microseconds, so lexical order in SQL equals
    /// chronological order.
    fn format_timestamp(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// Parse a stored timestamp - accepts RFC3339 and SQLite's "YYYY-MM-DD HH:MM:SS"
    fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, StoreError> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }

        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return Ok(naive.and_utc());
        }

        Err(StoreError::corrupt_record(format!(
            "Unable to parse timestamp '{}' as RFC3339 or SQLite format",
            s
        )))
    }

    /// Convert a row into a record
    ///
    /// Expected columns (in order): id, name, parent_id (nullable), created_at
    fn row_to_record(row: &Row) -> Result<NodeRecord, StoreError> {
        let corrupt = |field: &str, e: libsql::Error| {
            StoreError::corrupt_record(format!("Failed to get {}: {}", field, e))
        };

        let id: String = row.get(0).map_err(|e| corrupt("id", e))?;
        let name: String = row.get(1).map_err(|e| corrupt("name", e))?;
        let parent_id: Option<String> = row.get(2).map_err(|e| corrupt("parent_id", e))?;
        let created_at_str: String = row.get(3).map_err(|e| corrupt("created_at", e))?;

        Ok(NodeRecord {
            id,
            name,
            parent_id,
            created_at: Self::parse_timestamp(&created_at_str)?,
        })
    }
}

#[async_trait]
impl NodeStore for LibsqlStore {
    async fn fetch_all(&self) -> Result<Vec<NodeRecord>, StoreError> {
        let mut rows = self.db.db_fetch_all().await?;

        let mut records = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| StoreError::unavailable(e.to_string()))?
        {
            records.push(Self::row_to_record(&row)?);
        }

        tracing::debug!("fetch_all returned {} records", records.len());
        Ok(records)
    }

    async fn fetch_children(&self, parent_id: &str) -> Result<Vec<String>, StoreError> {
        self.db.db_fetch_child_ids(parent_id).await
    }

    async fn get(&self, id: &str) -> Result<Option<NodeRecord>, StoreError> {
        match self.db.db_get_node(id).await? {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn insert(
        &self,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<NodeRecord, StoreError> {
        if let Some(parent_id) = parent_id {
            if !self.db.db_node_exists(parent_id).await? {
                return Err(StoreError::invalid_parent(parent_id));
            }
        }

        let record = NodeRecord::new(name, parent_id.map(String::from));
        let created_at = Self::format_timestamp(&record.created_at);

        self.db
            .db_insert_node(DbInsertNodeParams {
                id: &record.id,
                name: &record.name,
                parent_id: record.parent_id.as_deref(),
                created_at: &created_at,
            })
            .await?;

        // Round-trip so the caller sees exactly what was persisted
        self.get(&record.id)
            .await?
            .ok_or_else(|| StoreError::unavailable("Node not found after insert"))
    }

    async fn update_name(&self, id: &str, name: &str) -> Result<Option<NodeRecord>, StoreError> {
        let rows_affected = self.db.db_update_name(id, name).await?;
        if rows_affected == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    async fn bulk_delete(&self, ids: &[String]) -> Result<u64, StoreError> {
        self.db.db_delete_nodes(ids).await
    }
}
