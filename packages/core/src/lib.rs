//! NodeTree Core
//!
//! Hierarchy management for named nodes stored as flat, parent-referencing
//! records.
//!
//! # Architecture
//!
//! - **Flat storage**: each record knows only its `parent_id`; the tree shape
//!   is derived on read
//! - **Closed-set deletes**: a subtree is planned in full, then removed with
//!   one bulk delete
//! - **libsql**: embedded SQLite-compatible database behind the [`db::NodeStore`]
//!   trait
//!
//! # Modules
//!
//! - [`models`] - Record, tree node and delete result types
//! - [`tree`] - Tree assembler and subtree deletion planner
//! - [`services`] - `NodeService`, the entry point for request handlers
//! - [`db`] - Store trait plus libsql and in-memory implementations

pub mod models;
pub mod tree;
pub mod services;
pub mod db;

// Re-export commonly used types
pub use db::{LibsqlStore, MemoryStore, NodeStore, StoreError};
pub use models::*;
pub use services::*;
pub use tree::{assemble, plan_deletion, DeletionPlan};
