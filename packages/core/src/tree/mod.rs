//! Tree Core
//!
//! The two structural operations of NodeTree, both pure with respect to the
//! store:
//!
//! - [`assemble`] - flat records → forest of owned tree nodes
//! - [`plan_deletion`] - target id → closed set of ids to delete together
//!
//! The store is consulted only through [`ChildLookup`] during planning; reads
//! and the final bulk delete are the caller's job (see `NodeService`).

mod assembler;
mod deletion;

pub use assembler::assemble;
pub use deletion::{plan_deletion, plan_deletion_concurrent, ChildLookup, DeletionPlan};
