//! MemoryStore - process-local NodeStore
//!
//! Keeps records in a `Vec` in creation order behind a `tokio::sync::RwLock`.
//! Every mutating operation holds the write lock for its full duration, which
//! gives `bulk_delete` its all-or-nothing guarantee.
//!
//! `with_records` seeds the store without integrity checks, so tests can build
//! dangling or cyclic data that `insert` would refuse.

use crate::db::node_store::NodeStore;
use crate::db::StoreError;
use crate::models::NodeRecord;
use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<NodeRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `records`, as-is
    pub fn with_records(records: Vec<NodeRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl NodeStore for MemoryStore {
    async fn fetch_all(&self) -> Result<Vec<NodeRecord>, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn fetch_children(&self, parent_id: &str) -> Result<Vec<String>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.parent_id.as_deref() == Some(parent_id))
            .map(|r| r.id.clone())
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<NodeRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn insert(
        &self,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<NodeRecord, StoreError> {
        let mut records = self.records.write().await;

        if let Some(parent_id) = parent_id {
            if !records.iter().any(|r| r.id == parent_id) {
                return Err(StoreError::invalid_parent(parent_id));
            }
        }

        let record = NodeRecord::new(name, parent_id.map(String::from));
        records.push(record.clone());
        Ok(record)
    }

    async fn update_name(&self, id: &str, name: &str) -> Result<Option<NodeRecord>, StoreError> {
        let mut records = self.records.write().await;
        Ok(records.iter_mut().find(|r| r.id == id).map(|record| {
            record.name = name.to_string();
            record.clone()
        }))
    }

    async fn bulk_delete(&self, ids: &[String]) -> Result<u64, StoreError> {
        let doomed: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut records = self.records.write().await;

        let before = records.len();
        records.retain(|r| !doomed.contains(r.id.as_str()));
        Ok((before - records.len()) as u64)
    }
}
