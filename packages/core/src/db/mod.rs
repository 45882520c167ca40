//! Database Layer
//!
//! Record store abstraction and its implementations:
//!
//! - [`NodeStore`] - the operations the tree core consumes
//! - [`LibsqlStore`] over [`DatabaseService`] - embedded libsql/SQLite storage
//! - [`MemoryStore`] - process-local storage for tests and ephemeral servers
//!
//! Referential integrity (`parent_id` must exist) is enforced here, at write
//! time. The tree core trusts it and never re-validates.

mod database;
mod error;
mod libsql_store;
mod memory_store;
pub mod node_store;

pub use database::{DatabaseService, DbInsertNodeParams};
pub use error::StoreError;
pub use libsql_store::LibsqlStore;
pub use memory_store::MemoryStore;
pub use node_store::NodeStore;
