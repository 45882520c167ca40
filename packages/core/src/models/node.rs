//! Node Data Structures
//!
//! This module defines the two shapes a node takes in NodeTree:
//!
//! - [`NodeRecord`] - the flat, persisted form. Every record points at its
//!   parent by id (`parent_id = None` means the record is a root).
//! - [`TreeNode`] - the assembled, in-memory form with owned `children`.
//!   It is a derived view recomputed on every read and never persisted.
//!
//! Trees may be arbitrarily deep. Dropping a [`TreeNode`] and writing a forest
//! with [`write_forest_json`] both use an explicit stack. The serde
//! `Serialize` impl nests one call per level and refuses trees deeper than
//! [`MAX_SERIALIZE_DEPTH`] with an error.
//!
//! # Examples
//!
//! ```rust
//! use nodetree_core::models::NodeRecord;
//!
//! let root = NodeRecord::new("Projects", None);
//! let child = NodeRecord::new("NodeTree", Some(root.id.clone()));
//!
//! assert!(root.is_root());
//! assert_eq!(child.parent_id.as_deref(), Some(root.id.as_str()));
//! ```

use chrono::{DateTime, Utc};
use serde::ser::{Error as _, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};
use std::io::Write;
use uuid::Uuid;

/// Deepest tree the `Serialize` impl of [`TreeNode`] will walk
pub const MAX_SERIALIZE_DEPTH: usize = 256;

/// Flat node record as held by the record store.
///
/// # Fields
///
/// - `id`: Unique identifier (UUID v4 for store-created records)
/// - `name`: Display name, validated by the request layer before it gets here
/// - `parent_id`: Parent record id, `None` for roots
/// - `created_at`: Insert timestamp, used by stores for stable enumeration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    /// Unique identifier
    pub id: String,

    /// Node name
    pub name: String,

    /// Parent node ID (`None` means root)
    #[serde(default)]
    pub parent_id: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl NodeRecord {
    /// Create a new record with an auto-generated UUID and the current timestamp
    pub fn new(name: impl Into<String>, parent_id: Option<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), name, parent_id)
    }

    /// Create a record with an explicit id
    ///
    /// Used when seeding stores with known data (fixtures, imports).
    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        parent_id: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id,
            created_at: Utc::now(),
        }
    }

    /// Whether this record has no parent reference
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Assembled tree node.
///
/// Carries the record's scalar fields plus the nodes that reference it as
/// their parent. Children are owned exclusively by their parent; the order of
/// `children` has no meaning beyond the store's enumeration order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Materialize a childless tree node from a record
    pub fn from_record(record: NodeRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            parent_id: record.parent_id,
            created_at: record.created_at,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including `self`
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Ids of every node in this subtree, in depth-first pre-order
    pub fn ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            ids.push(node.id.as_str());
            stack.extend(node.children.iter().rev());
        }
        ids
    }

    /// Find a node by id within this subtree
    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.id == id {
                return Some(node);
            }
            stack.extend(node.children.iter());
        }
        None
    }

    /// Ids of the direct children
    pub fn child_ids(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.id.as_str()).collect()
    }
}

impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

impl Serialize for TreeNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NodeAtDepth {
            node: self,
            depth: 1,
        }
        .serialize(serializer)
    }
}

struct NodeAtDepth<'a> {
    node: &'a TreeNode,
    depth: usize,
}

impl Serialize for NodeAtDepth<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.depth > MAX_SERIALIZE_DEPTH {
            return Err(S::Error::custom(format!(
                "tree deeper than {} levels; use write_forest_json",
                MAX_SERIALIZE_DEPTH
            )));
        }

        let node = self.node;
        let mut state = serializer.serialize_struct("TreeNode", 5)?;
        state.serialize_field("id", &node.id)?;
        state.serialize_field("name", &node.name)?;
        state.serialize_field("parentId", &node.parent_id)?;
        state.serialize_field("createdAt", &node.created_at)?;
        state.serialize_field(
            "children",
            &ChildrenAtDepth {
                children: &node.children,
                depth: self.depth + 1,
            },
        )?;
        state.end()
    }
}

struct ChildrenAtDepth<'a> {
    children: &'a [TreeNode],
    depth: usize,
}

impl Serialize for ChildrenAtDepth<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.children.iter().map(|node| NodeAtDepth {
            node,
            depth: self.depth,
        }))
    }
}

/// Write a forest as a JSON array without recursion
///
/// Produces the same document as serializing the forest with `serde_json`,
/// for any depth.
pub fn write_forest_json<W: Write>(forest: &[TreeNode], mut writer: W) -> serde_json::Result<()> {
    write_raw(&mut writer, b"[")?;

    // One sibling iterator per open `children` array, plus the roots
    let mut stack: Vec<(std::slice::Iter<'_, TreeNode>, bool)> = vec![(forest.iter(), true)];
    while let Some((siblings, first)) = stack.last_mut() {
        match siblings.next() {
            Some(node) => {
                if !*first {
                    write_raw(&mut writer, b",")?;
                }
                *first = false;
                write_node_head(&mut writer, node)?;
                stack.push((node.children.iter(), true));
            }
            None => {
                stack.pop();
                // Closes a `children` array and its node, or the outer array
                let close: &[u8] = if stack.is_empty() { b"]" } else { b"]}" };
                write_raw(&mut writer, close)?;
            }
        }
    }

    Ok(())
}

/// Everything of a node object up to and including `"children":[`
fn write_node_head<W: Write>(writer: &mut W, node: &TreeNode) -> serde_json::Result<()> {
    write_raw(writer, br#"{"id":"#)?;
    serde_json::to_writer(&mut *writer, &node.id)?;
    write_raw(writer, br#","name":"#)?;
    serde_json::to_writer(&mut *writer, &node.name)?;
    write_raw(writer, br#","parentId":"#)?;
    serde_json::to_writer(&mut *writer, &node.parent_id)?;
    write_raw(writer, br#","createdAt":"#)?;
    serde_json::to_writer(&mut *writer, &node.created_at)?;
    write_raw(writer, br#","children":["#)
}

fn write_raw<W: Write>(writer: &mut W, bytes: &[u8]) -> serde_json::Result<()> {
    writer.write_all(bytes).map_err(serde_json::Error::io)
}

/// Total number of nodes across a forest
pub fn forest_node_count(forest: &[TreeNode]) -> usize {
    forest.iter().map(TreeNode::node_count).sum()
}

/// Find a node by id anywhere in a forest
pub fn find_in_forest<'a>(forest: &'a [TreeNode], id: &str) -> Option<&'a TreeNode> {
    forest.iter().find_map(|root| root.find(id))
}

/// Result of a subtree deletion
///
/// DELETE is idempotent: deleting a node that no longer exists succeeds with
/// `deleted_count = 0`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    /// Number of records actually removed from the store
    pub deleted_count: u64,
}

impl DeleteResult {
    pub fn new(deleted_count: u64) -> Self {
        Self { deleted_count }
    }

    /// Whether the target existed at deletion time
    pub fn existed(&self) -> bool {
        self.deleted_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaf(id: &str, parent: Option<&str>) -> TreeNode {
        TreeNode::from_record(NodeRecord::with_id(id, id, parent.map(String::from)))
    }

    #[test]
    fn test_new_record_generates_unique_ids() {
        let a = NodeRecord::new("a", None);
        let b = NodeRecord::new("b", None);
        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = NodeRecord::with_id("n1", "Root", Some("p1".to_string()));
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["id"], json!("n1"));
        assert_eq!(value["name"], json!("Root"));
        assert_eq!(value["parentId"], json!("p1"));
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_tree_node_always_serializes_children() {
        let node = leaf("a", None);
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["children"], json!([]));
        assert_eq!(value["parentId"], json!(null));
    }

    #[test]
    fn test_subtree_helpers() {
        let mut b = leaf("b", Some("a"));
        b.children.push(leaf("c", Some("b")));
        let mut a = leaf("a", None);
        a.children.push(b);
        a.children.push(leaf("d", Some("a")));

        assert_eq!(a.node_count(), 4);
        assert_eq!(a.ids(), vec!["a", "b", "c", "d"]);
        assert_eq!(a.child_ids(), vec!["b", "d"]);
        assert_eq!(a.find("c").map(|n| n.name.as_str()), Some("c"));
        assert!(a.find("zzz").is_none());

        let forest = vec![a, leaf("e", None)];
        assert_eq!(forest_node_count(&forest), 5);
        assert!(find_in_forest(&forest, "e").is_some());
    }

    fn chain(depth: usize) -> TreeNode {
        let mut node = leaf(&format!("n{}", depth - 1), None);
        for i in (0..depth - 1).rev() {
            let mut parent = leaf(&format!("n{}", i), None);
            parent.children.push(node);
            node = parent;
        }
        node
    }

    #[test]
    fn test_deep_tree_drops_without_overflow() {
        let root = chain(200_000);
        assert_eq!(root.node_count(), 200_000);
        drop(root);
    }

    #[test]
    fn test_forest_writer_matches_serde() {
        let mut b = leaf("b", Some("a"));
        b.children.push(leaf("c", Some("b")));
        let mut a = leaf("a", None);
        a.children.push(b);
        a.children.push(leaf("d", Some("a")));
        let forest = vec![a, leaf("e", None)];

        let mut written = Vec::new();
        write_forest_json(&forest, &mut written).unwrap();

        assert_eq!(written, serde_json::to_vec(&forest).unwrap());
    }

    #[test]
    fn test_forest_writer_empty_forest() {
        let mut written = Vec::new();
        write_forest_json(&[], &mut written).unwrap();
        assert_eq!(written, b"[]");
    }

    #[test]
    fn test_forest_writer_handles_deep_chain() {
        let depth = 5_000;
        let forest = vec![chain(depth)];

        let mut written = Vec::new();
        write_forest_json(&forest, &mut written).unwrap();
        let text = String::from_utf8(written).unwrap();

        assert!(text.starts_with(r#"[{"id":"n0","name":"n0","#));
        assert_eq!(text.matches(r#""children":["#).count(), depth);
        assert!(text.ends_with(&format!("{}]", "]}".repeat(depth))));
    }

    #[test]
    fn test_serialize_rejects_excessive_depth() {
        let forest = vec![chain(5_000)];
        let err = serde_json::to_string(&forest).unwrap_err();
        assert!(err.to_string().contains("write_forest_json"));

        assert!(serde_json::to_string(&chain(MAX_SERIALIZE_DEPTH)).is_ok());
    }

    #[test]
    fn test_delete_result_existed() {
        assert!(DeleteResult::new(3).existed());
        assert!(!DeleteResult::new(0).existed());
    }
}
