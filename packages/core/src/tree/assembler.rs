//! Tree Assembler
//!
//! Converts a flat collection of parent-referencing records into a forest of
//! owned [`TreeNode`]s.
//!
//! # Algorithm
//!
//! Arena + index. Records stay in one `Vec`; an `id → index` map resolves each
//! record's parent in O(1); child links are indices into the arena.
//!
//! 1. Index every record by id (one pass).
//! 2. For every record, attach its index to its parent's child list. A record
//!    with no parent, or whose parent id is not in the input, becomes a root.
//! 3. Materialize owned nodes bottom-up from a pre-order of the roots.
//!
//! Each record's `parent_id` is read exactly once and parent chains are never
//! walked, so the assembler terminates on any finite input. Records on a cycle
//! (and anything hanging below them) are unreachable from a root and are left
//! out of the forest.
//!
//! # Examples
//!
//! ```rust
//! use nodetree_core::models::NodeRecord;
//! use nodetree_core::tree::assemble;
//!
//! let records = vec![
//!     NodeRecord::with_id("A", "A", None),
//!     NodeRecord::with_id("B", "B", Some("A".to_string())),
//!     NodeRecord::with_id("C", "C", Some("B".to_string())),
//!     NodeRecord::with_id("D", "D", None),
//! ];
//!
//! let forest = assemble(records);
//! assert_eq!(forest.len(), 2);
//! assert_eq!(forest[0].children[0].children[0].id, "C");
//! ```

use crate::models::{NodeRecord, TreeNode};
use std::collections::HashMap;

/// Assemble a forest from flat records
///
/// Never fails. Empty input yields an empty forest. Roots and children keep
/// the order in which records were enumerated.
pub fn assemble(records: Vec<NodeRecord>) -> Vec<TreeNode> {
    let count = records.len();

    // Duplicate ids violate the store invariant; the last one claims the slot
    let mut index_by_id: HashMap<&str, usize> = HashMap::with_capacity(count);
    for (index, record) in records.iter().enumerate() {
        index_by_id.insert(record.id.as_str(), index);
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut roots: Vec<usize> = Vec::new();

    for (index, record) in records.iter().enumerate() {
        match record.parent_id.as_deref() {
            None => roots.push(index),
            Some(parent_id) => match index_by_id.get(parent_id) {
                Some(&parent) => children[parent].push(index),
                None => {
                    tracing::debug!(
                        "Node {} references missing parent {}, treating as root",
                        record.id,
                        parent_id
                    );
                    roots.push(index);
                }
            },
        }
    }

    materialize(records, &children, &roots)
}

/// Build owned nodes from the arena without recursion
///
/// Every index appears in at most one child list or in `roots`, so the part
/// reachable from `roots` is a forest and each node is visited once.
fn materialize(records: Vec<NodeRecord>, children: &[Vec<usize>], roots: &[usize]) -> Vec<TreeNode> {
    let mut slots: Vec<Option<TreeNode>> = records
        .into_iter()
        .map(|record| Some(TreeNode::from_record(record)))
        .collect();

    let mut pre_order = Vec::with_capacity(slots.len());
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(index) = stack.pop() {
        pre_order.push(index);
        stack.extend(children[index].iter().rev().copied());
    }

    // Reversed pre-order completes every subtree before its parent is reached
    for &index in pre_order.iter().rev() {
        if children[index].is_empty() {
            continue;
        }
        let built: Vec<TreeNode> = children[index]
            .iter()
            .filter_map(|&child| slots[child].take())
            .collect();
        if let Some(node) = slots[index].as_mut() {
            node.children = built;
        }
    }

    roots.iter().filter_map(|&root| slots[root].take()).collect()
}
