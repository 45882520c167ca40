//! Integration tests for subtree deletion and tree assembly
//!
//! Every scenario runs against both store implementations:
//! - LibsqlStore on a temporary database file
//! - MemoryStore
//!
//! Tests cover:
//! - Deleting a subtree removes exactly the closed set
//! - Ancestors and unrelated branches survive
//! - Missing targets are a successful no-op
//! - Wide and deep hierarchies
//! - Tree reads after deletes

use anyhow::Result;
use nodetree_core::{
    db::{DatabaseService, LibsqlStore, MemoryStore, NodeStore},
    find_in_forest, forest_node_count,
    services::NodeService,
    tree::{plan_deletion, plan_deletion_concurrent},
};
use std::collections::HashSet;
use std::sync::Arc;
use tempfile::TempDir;

/// Test helper: a libsql-backed service plus the temp dir keeping it alive
async fn create_libsql_env() -> Result<(Arc<dyn NodeStore>, NodeService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let db = Arc::new(DatabaseService::new(db_path).await?);
    let store: Arc<dyn NodeStore> = Arc::new(LibsqlStore::new(db));
    let service = NodeService::new(store.clone());
    Ok((store, service, temp_dir))
}

fn create_memory_env() -> (Arc<dyn NodeStore>, NodeService) {
    let store: Arc<dyn NodeStore> = Arc::new(MemoryStore::new());
    let service = NodeService::new(store.clone());
    (store, service)
}

/// Ids created for the scenario tree:
///
/// ```text
/// root
/// ├── a
/// │   ├── a1
/// │   └── a2
/// │       └── a2x
/// └── b
///     └── b1
/// other
/// ```
struct Scenario {
    root: String,
    a: String,
    a1: String,
    a2: String,
    a2x: String,
    b: String,
    b1: String,
    other: String,
}

async fn build_scenario(service: &NodeService) -> Result<Scenario> {
    let root = service.create_node("root", None).await?.id;
    let a = service.create_node("a", Some(&root)).await?.id;
    let a1 = service.create_node("a1", Some(&a)).await?.id;
    let a2 = service.create_node("a2", Some(&a)).await?.id;
    let a2x = service.create_node("a2x", Some(&a2)).await?.id;
    let b = service.create_node("b", Some(&root)).await?.id;
    let b1 = service.create_node("b1", Some(&b)).await?.id;
    let other = service.create_node("other", None).await?.id;

    Ok(Scenario {
        root,
        a,
        a1,
        a2,
        a2x,
        b,
        b1,
        other,
    })
}

async fn remaining_ids(store: &Arc<dyn NodeStore>) -> Result<HashSet<String>> {
    Ok(store.fetch_all().await?.into_iter().map(|r| r.id).collect())
}

fn ids(values: &[&String]) -> HashSet<String> {
    values.iter().map(|s| s.to_string()).collect()
}

// =========================================================================
// Shared scenarios
// =========================================================================

async fn check_delete_branch(store: Arc<dyn NodeStore>, service: NodeService) -> Result<()> {
    let s = build_scenario(&service).await?;

    let result = service.delete_subtree(&s.a).await?;

    assert_eq!(result.deleted_count, 4);
    assert_eq!(
        remaining_ids(&store).await?,
        ids(&[&s.root, &s.b, &s.b1, &s.other])
    );
    Ok(())
}

async fn check_delete_root(store: Arc<dyn NodeStore>, service: NodeService) -> Result<()> {
    let s = build_scenario(&service).await?;

    let result = service.delete_subtree(&s.root).await?;

    assert_eq!(result.deleted_count, 7);
    assert_eq!(remaining_ids(&store).await?, ids(&[&s.other]));
    Ok(())
}

async fn check_delete_missing(store: Arc<dyn NodeStore>, service: NodeService) -> Result<()> {
    build_scenario(&service).await?;

    let result = service.delete_subtree("does-not-exist").await?;

    assert_eq!(result.deleted_count, 0);
    assert_eq!(remaining_ids(&store).await?.len(), 8);
    Ok(())
}

async fn check_tree_after_delete(service: NodeService) -> Result<()> {
    let s = build_scenario(&service).await?;
    service.delete_subtree(&s.a2).await?;

    let forest = service.get_tree().await?;

    assert_eq!(forest.len(), 2);
    assert_eq!(forest_node_count(&forest), 6);
    let a = find_in_forest(&forest, &s.a).expect("a survives");
    assert_eq!(a.child_ids(), vec![s.a1.as_str()]);
    assert!(find_in_forest(&forest, &s.a2x).is_none());
    Ok(())
}

async fn check_planners_agree(store: Arc<dyn NodeStore>, service: NodeService) -> Result<()> {
    let s = build_scenario(&service).await?;

    let sequential = plan_deletion(&s.root, store.as_ref()).await?;
    let concurrent = plan_deletion_concurrent(&s.root, store.as_ref()).await?;

    assert_eq!(sequential.len(), 7);
    assert!(!sequential.contains(&s.other));
    assert_eq!(sequential.into_set(), concurrent.into_set());
    Ok(())
}

async fn check_wide_and_deep(store: Arc<dyn NodeStore>, service: NodeService) -> Result<()> {
    let top = service.create_node("top", None).await?.id;
    let keep = service.create_node("keep", None).await?.id;

    // Wide level, enough to span several delete chunks in libsql
    for i in 0..1200 {
        service.create_node(&format!("wide {}", i), Some(&top)).await?;
    }

    // Deep chain
    let mut parent = top.clone();
    for i in 0..200 {
        parent = service.create_node(&format!("deep {}", i), Some(&parent)).await?.id;
    }

    let result = service.delete_subtree(&top).await?;

    assert_eq!(result.deleted_count, 1 + 1200 + 200);
    assert_eq!(remaining_ids(&store).await?, ids(&[&keep]));
    Ok(())
}

// =========================================================================
// libsql
// =========================================================================

#[tokio::test]
async fn test_libsql_delete_branch() -> Result<()> {
    let (store, service, _temp_dir) = create_libsql_env().await?;
    check_delete_branch(store, service).await
}

#[tokio::test]
async fn test_libsql_delete_root() -> Result<()> {
    let (store, service, _temp_dir) = create_libsql_env().await?;
    check_delete_root(store, service).await
}

#[tokio::test]
async fn test_libsql_delete_missing() -> Result<()> {
    let (store, service, _temp_dir) = create_libsql_env().await?;
    check_delete_missing(store, service).await
}

#[tokio::test]
async fn test_libsql_tree_after_delete() -> Result<()> {
    let (_store, service, _temp_dir) = create_libsql_env().await?;
    check_tree_after_delete(service).await
}

#[tokio::test]
async fn test_libsql_planners_agree() -> Result<()> {
    let (store, service, _temp_dir) = create_libsql_env().await?;
    check_planners_agree(store, service).await
}

#[tokio::test]
async fn test_libsql_wide_and_deep() -> Result<()> {
    let (store, service, _temp_dir) = create_libsql_env().await?;
    check_wide_and_deep(store, service).await
}

#[tokio::test]
async fn test_libsql_data_survives_reopen() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");

    let root_id = {
        let db = Arc::new(DatabaseService::new(db_path.clone()).await?);
        let service = NodeService::new(Arc::new(LibsqlStore::new(db)));
        let root = service.create_node("root", None).await?;
        service.create_node("child", Some(&root.id)).await?;
        root.id
    };

    let db = Arc::new(DatabaseService::new(db_path).await?);
    let service = NodeService::new(Arc::new(LibsqlStore::new(db)));
    let forest = service.get_tree().await?;

    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].id, root_id);
    assert_eq!(forest[0].children.len(), 1);
    Ok(())
}

// =========================================================================
// Memory
// =========================================================================

#[tokio::test]
async fn test_memory_delete_branch() -> Result<()> {
    let (store, service) = create_memory_env();
    check_delete_branch(store, service).await
}

#[tokio::test]
async fn test_memory_delete_root() -> Result<()> {
    let (store, service) = create_memory_env();
    check_delete_root(store, service).await
}

#[tokio::test]
async fn test_memory_delete_missing() -> Result<()> {
    let (store, service) = create_memory_env();
    check_delete_missing(store, service).await
}

#[tokio::test]
async fn test_memory_tree_after_delete() -> Result<()> {
    let (_store, service) = create_memory_env();
    check_tree_after_delete(service).await
}

#[tokio::test]
async fn test_memory_planners_agree() -> Result<()> {
    let (store, service) = create_memory_env();
    check_planners_agree(store, service).await
}

#[tokio::test]
async fn test_memory_wide_and_deep() -> Result<()> {
    let (store, service) = create_memory_env();
    check_wide_and_deep(store, service).await
}
