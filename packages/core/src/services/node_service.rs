//! Node Service - Tree Reads and Subtree Deletes
//!
//! This module is the seam between the request-handling layer and the tree
//! core:
//!
//! - Reads: `fetch_all` → [`assemble`] → forest
//! - Deletes: [`plan_deletion`] → one `bulk_delete` over the whole plan
//! - Writes: insert and rename pass straight through to the store
//!
//! The service does not validate names. Callers trim and check user input
//! before it arrives here.

use crate::db::NodeStore;
use crate::models::{DeleteResult, NodeRecord, TreeNode};
use crate::services::error::NodeServiceError;
use crate::tree::{assemble, plan_deletion};
use std::sync::Arc;

/// Node service over any [`NodeStore`]
///
/// Cheap to clone; the store is shared behind an `Arc`.
#[derive(Clone)]
pub struct NodeService {
    store: Arc<dyn NodeStore>,
}

impl NodeService {
    /// Create a new NodeService
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use nodetree_core::db::MemoryStore;
    /// # use nodetree_core::services::NodeService;
    /// # use std::sync::Arc;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let service = NodeService::new(Arc::new(MemoryStore::new()));
    /// let root = service.create_node("Root", None).await?;
    /// service.create_node("Child", Some(&root.id)).await?;
    ///
    /// let forest = service.get_tree().await?;
    /// assert_eq!(forest[0].children.len(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self { store }
    }

    /// Access the underlying store
    pub fn store(&self) -> &Arc<dyn NodeStore> {
        &self.store
    }

    /// Fetch every record and assemble the forest
    ///
    /// Records with a dangling parent reference come back as roots.
    pub async fn get_tree(&self) -> Result<Vec<TreeNode>, NodeServiceError> {
        let records = self.store.fetch_all().await?;
        let record_count = records.len();
        let forest = assemble(records);

        tracing::debug!(
            "Assembled {} records into {} root(s)",
            record_count,
            forest.len()
        );
        Ok(forest)
    }

    /// Get a single record
    pub async fn get_node(&self, id: &str) -> Result<Option<NodeRecord>, NodeServiceError> {
        Ok(self.store.get(id).await?)
    }

    /// Create a node under `parent_id` (or as a root)
    ///
    /// # Errors
    ///
    /// - [`NodeServiceError::InvalidParent`] if the parent does not exist
    pub async fn create_node(
        &self,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<NodeRecord, NodeServiceError> {
        let record = self.store.insert(name, parent_id).await?;
        tracing::info!(
            "Created node {} (parent: {})",
            record.id,
            record.parent_id.as_deref().unwrap_or("<root>")
        );
        Ok(record)
    }

    /// Rename a node
    ///
    /// # Errors
    ///
    /// - [`NodeServiceError::NodeNotFound`] if no node has this id
    pub async fn rename_node(&self, id: &str, name: &str) -> Result<NodeRecord, NodeServiceError> {
        let record = self
            .store
            .update_name(id, name)
            .await?
            .ok_or_else(|| NodeServiceError::node_not_found(id))?;

        tracing::info!("Renamed node {}", id);
        Ok(record)
    }

    /// Delete a node together with its entire subtree
    ///
    /// Plans the closed id set first, then removes it with a single bulk
    /// delete. If planning fails nothing is deleted. Deleting an unknown id
    /// succeeds with `deleted_count = 0`.
    pub async fn delete_subtree(&self, id: &str) -> Result<DeleteResult, NodeServiceError> {
        let plan = plan_deletion(id, self.store.as_ref()).await?;
        let deleted_count = self.store.bulk_delete(plan.ids()).await?;

        if deleted_count == 0 {
            tracing::debug!("Delete of {} was a no-op (node not found)", id);
        } else {
            tracing::info!("Deleted node {} and {} descendant(s)", id, deleted_count - 1);
        }

        Ok(DeleteResult::new(deleted_count))
    }
}

// Behavioural tests in a separate module
#[cfg(test)]
#[path = "node_service_test.rs"]
mod node_service_test;
