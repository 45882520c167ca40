//! Subtree Deletion Planner
//!
//! Computes the closed set of ids that must be removed together when a node is
//! deleted: the target plus every descendant at any depth. The planner only
//! discovers; the caller commits the whole plan with one bulk delete, which is
//! what makes the removal atomic even though discovery takes many lookups.
//!
//! # Cost
//!
//! One [`ChildLookup::child_ids`] call per id in the final plan.
//!
//! # Termination
//!
//! An id is queued only when it is first added to the plan, so traversal ends
//! even if the stored graph contains a cycle.

use crate::db::{NodeStore, StoreError};
use async_trait::async_trait;
use futures::future::try_join_all;
use std::collections::{HashSet, VecDeque};

/// Source of parent → child edges for the planner
#[async_trait]
pub trait ChildLookup: Send + Sync {
    /// Ids of the direct children of `parent_id`
    async fn child_ids(&self, parent_id: &str) -> Result<Vec<String>, StoreError>;
}

#[async_trait]
impl<S> ChildLookup for S
where
    S: NodeStore + ?Sized,
{
    async fn child_ids(&self, parent_id: &str) -> Result<Vec<String>, StoreError> {
        self.fetch_children(parent_id).await
    }
}

/// Ids scheduled for deletion
///
/// Keeps discovery (breadth-first) order alongside a membership set. The
/// target is always the first id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionPlan {
    order: Vec<String>,
    members: HashSet<String>,
}

impl DeletionPlan {
    fn new(target_id: &str) -> Self {
        Self {
            order: vec![target_id.to_string()],
            members: HashSet::from([target_id.to_string()]),
        }
    }

    /// Add `id`; returns false if it was already planned
    fn insert(&mut self, id: &str) -> bool {
        if self.members.contains(id) {
            return false;
        }
        self.members.insert(id.to_string());
        self.order.push(id.to_string());
        true
    }

    pub fn target_id(&self) -> &str {
        &self.order[0]
    }

    /// Ids in discovery order, target first
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Always false: a plan contains at least its target
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn into_set(self) -> HashSet<String> {
        self.members
    }
}

/// Plan the deletion of `target_id` and its whole subtree
///
/// Breadth-first, one lookup at a time. The target does not need to exist: an
/// unknown id yields a plan containing only that id.
///
/// # Errors
///
/// The first failing lookup aborts planning and its error is returned as-is;
/// no partial plan escapes.
pub async fn plan_deletion<L>(target_id: &str, lookup: &L) -> Result<DeletionPlan, StoreError>
where
    L: ChildLookup + ?Sized,
{
    let mut plan = DeletionPlan::new(target_id);
    let mut queue = VecDeque::from([target_id.to_string()]);

    while let Some(current) = queue.pop_front() {
        for child in lookup.child_ids(&current).await? {
            if plan.insert(&child) {
                queue.push_back(child);
            }
        }
    }

    tracing::debug!(
        "Planned deletion of {} ({} nodes)",
        target_id,
        plan.len()
    );
    Ok(plan)
}

/// Plan a deletion level by level, looking up a whole frontier concurrently
///
/// Produces the same set as [`plan_deletion`]. Deduplication happens after
/// each frontier resolves, on this task only, so no locking is involved.
pub async fn plan_deletion_concurrent<L>(
    target_id: &str,
    lookup: &L,
) -> Result<DeletionPlan, StoreError>
where
    L: ChildLookup + ?Sized,
{
    let mut plan = DeletionPlan::new(target_id);
    let mut frontier = vec![target_id.to_string()];

    while !frontier.is_empty() {
        let batches = try_join_all(frontier.iter().map(|id| lookup.child_ids(id))).await?;

        let mut next = Vec::new();
        for child in batches.into_iter().flatten() {
            if plan.insert(&child) {
                next.push(child);
            }
        }
        frontier = next;
    }

    tracing::debug!(
        "Planned deletion of {} ({} nodes, concurrent)",
        target_id,
        plan.len()
    );
    Ok(plan)
}
