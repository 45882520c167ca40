#[cfg(test)]
mod tests {
    use crate::db::{MemoryStore, NodeStore, StoreError};
    use crate::models::{find_in_forest, NodeRecord};
    use crate::services::error::NodeServiceError;
    use crate::services::node_service::NodeService;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    fn example_store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::with_records(vec![
            NodeRecord::with_id("A", "A", None),
            NodeRecord::with_id("B", "B", Some("A".to_string())),
            NodeRecord::with_id("C", "C", Some("B".to_string())),
            NodeRecord::with_id("D", "D", None),
        ]))
    }

    /// Store whose child lookups fail for one id; counts bulk deletes
    struct FlakyStore {
        inner: MemoryStore,
        fail_children_of: String,
        bulk_deletes: AtomicU64,
    }

    #[async_trait]
    impl NodeStore for FlakyStore {
        async fn fetch_all(&self) -> Result<Vec<NodeRecord>, StoreError> {
            self.inner.fetch_all().await
        }

        async fn fetch_children(&self, parent_id: &str) -> Result<Vec<String>, StoreError> {
            if parent_id == self.fail_children_of {
                return Err(StoreError::unavailable("connection reset"));
            }
            self.inner.fetch_children(parent_id).await
        }

        async fn get(&self, id: &str) -> Result<Option<NodeRecord>, StoreError> {
            self.inner.get(id).await
        }

        async fn insert(
            &self,
            name: &str,
            parent_id: Option<&str>,
        ) -> Result<NodeRecord, StoreError> {
            self.inner.insert(name, parent_id).await
        }

        async fn update_name(
            &self,
            id: &str,
            name: &str,
        ) -> Result<Option<NodeRecord>, StoreError> {
            self.inner.update_name(id, name).await
        }

        async fn bulk_delete(&self, ids: &[String]) -> Result<u64, StoreError> {
            self.bulk_deletes.fetch_add(1, Ordering::SeqCst);
            self.inner.bulk_delete(ids).await
        }
    }

    #[tokio::test]
    async fn test_get_tree_assembles_forest() {
        let service = NodeService::new(example_store());

        let forest = service.get_tree().await.unwrap();

        assert_eq!(forest.len(), 2);
        let a = find_in_forest(&forest, "A").unwrap();
        assert_eq!(a.child_ids(), vec!["B"]);
        assert_eq!(a.children[0].child_ids(), vec!["C"]);
        assert!(find_in_forest(&forest, "D").unwrap().children.is_empty());
    }

    #[tokio::test]
    async fn test_get_tree_empty_store() {
        let service = NodeService::new(Arc::new(MemoryStore::new()));
        assert!(service.get_tree().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_subtree_leaves_unrelated_nodes() {
        let store = example_store();
        let service = NodeService::new(store.clone());

        let result = service.delete_subtree("A").await.unwrap();

        assert_eq!(result.deleted_count, 3);
        let remaining: Vec<String> = store
            .fetch_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(remaining, vec!["D".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_leaf_keeps_ancestors() {
        let store = example_store();
        let service = NodeService::new(store.clone());

        let result = service.delete_subtree("C").await.unwrap();

        assert_eq!(result.deleted_count, 1);
        assert_eq!(store.len().await, 3);
        assert!(store.get("B").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_missing_node_is_noop() {
        let store = example_store();
        let service = NodeService::new(store.clone());

        let result = service.delete_subtree("nonexistent").await.unwrap();

        assert_eq!(result.deleted_count, 0);
        assert!(!result.existed());
        assert_eq!(store.len().await, 4);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let service = NodeService::new(example_store());

        assert_eq!(service.delete_subtree("A").await.unwrap().deleted_count, 3);
        assert_eq!(service.delete_subtree("A").await.unwrap().deleted_count, 0);
    }

    #[tokio::test]
    async fn test_failed_planning_deletes_nothing() {
        let store = Arc::new(FlakyStore {
            inner: MemoryStore::with_records(vec![
                NodeRecord::with_id("A", "A", None),
                NodeRecord::with_id("B", "B", Some("A".to_string())),
                NodeRecord::with_id("C", "C", Some("B".to_string())),
            ]),
            fail_children_of: "B".to_string(),
            bulk_deletes: AtomicU64::new(0),
        });
        let service = NodeService::new(store.clone());

        let err = service.delete_subtree("A").await.unwrap_err();

        assert!(err.is_store_unavailable());
        assert_eq!(store.bulk_deletes.load(Ordering::SeqCst), 0);
        assert_eq!(store.inner.len().await, 3);
    }

    #[tokio::test]
    async fn test_create_node_under_parent() {
        let service = NodeService::new(Arc::new(MemoryStore::new()));

        let root = service.create_node("Root", None).await.unwrap();
        let child = service.create_node("Child", Some(&root.id)).await.unwrap();

        assert!(root.is_root());
        assert_eq!(child.parent_id.as_deref(), Some(root.id.as_str()));

        let forest = service.get_tree().await.unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].child_ids(), vec![child.id.as_str()]);
    }

    #[tokio::test]
    async fn test_create_node_with_unknown_parent() {
        let service = NodeService::new(Arc::new(MemoryStore::new()));

        let err = service.create_node("Lost", Some("missing")).await.unwrap_err();

        assert!(
            matches!(err, NodeServiceError::InvalidParent { ref parent_id } if parent_id == "missing")
        );
    }

    #[tokio::test]
    async fn test_rename_node() {
        let service = NodeService::new(example_store());

        let renamed = service.rename_node("B", "Renamed").await.unwrap();
        assert_eq!(renamed.name, "Renamed");
        assert_eq!(renamed.parent_id.as_deref(), Some("A"));

        let fetched = service.get_node("B").await.unwrap().unwrap();
        assert_eq!(fetched.name, "Renamed");
    }

    #[tokio::test]
    async fn test_rename_missing_node() {
        let service = NodeService::new(example_store());

        let err = service.rename_node("ghost", "Name").await.unwrap_err();

        assert!(matches!(err, NodeServiceError::NodeNotFound { ref id } if id == "ghost"));
    }
}
