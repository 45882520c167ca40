//! NodeStore Trait - Record Store Abstraction
//!
//! This module defines the `NodeStore` trait: the small set of operations the
//! tree core needs from persistence. Business logic in `NodeService`, the tree
//! assembler and the deletion planner only ever talk to this trait.
//!
//! # Implementations
//!
//! - [`LibsqlStore`](crate::db::LibsqlStore) - embedded libsql/SQLite database
//! - [`MemoryStore`](crate::db::MemoryStore) - process-local, for tests and
//!   throwaway servers
//!
//! # Examples
//!
//! ```rust,no_run
//! use nodetree_core::db::{MemoryStore, NodeStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store: Arc<dyn NodeStore> = Arc::new(MemoryStore::new());
//!
//!     let root = store.insert("Root", None).await?;
//!     let child = store.insert("Child", Some(&root.id)).await?;
//!
//!     assert_eq!(store.fetch_children(&root.id).await?, vec![child.id]);
//!     Ok(())
//! }
//! ```

use crate::db::StoreError;
use crate::models::NodeRecord;
use async_trait::async_trait;

/// Abstraction layer for node record persistence
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a single store can be shared
/// across request handlers behind an `Arc`.
///
/// # Ordering
///
/// `fetch_all` and `fetch_children` return records in creation order. Callers
/// may rely on this for stable presentation, never for correctness.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Fetch every record of the hierarchy
    async fn fetch_all(&self) -> Result<Vec<NodeRecord>, StoreError>;

    /// Fetch the ids of the direct children of `parent_id`
    ///
    /// An unknown `parent_id` yields an empty list, not an error.
    async fn fetch_children(&self, parent_id: &str) -> Result<Vec<String>, StoreError>;

    /// Fetch a single record
    ///
    /// - `Ok(Some(record))` if the record exists
    /// - `Ok(None)` if it doesn't (not an error)
    async fn get(&self, id: &str) -> Result<Option<NodeRecord>, StoreError>;

    /// Insert a new record
    ///
    /// The store assigns the id and creation timestamp.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidParent`] if `parent_id` does not reference an
    ///   existing record
    async fn insert(&self, name: &str, parent_id: Option<&str>)
        -> Result<NodeRecord, StoreError>;

    /// Rename a record
    ///
    /// Returns `Ok(None)` when no record with `id` exists.
    async fn update_name(&self, id: &str, name: &str) -> Result<Option<NodeRecord>, StoreError>;

    /// Delete every record whose id is in `ids`
    ///
    /// # Atomicity
    ///
    /// Either all listed records that exist are removed, or none are.
    /// Ids that don't exist are ignored.
    ///
    /// # Returns
    ///
    /// Number of records removed
    async fn bulk_delete(&self, ids: &[String]) -> Result<u64, StoreError>;
}
