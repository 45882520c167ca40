//! Business Services
//!
//! - `NodeService` - tree reads, node CRUD and subtree deletion
//!
//! Services coordinate between the store layer and the tree core; request
//! handlers call services, never stores directly.

pub mod error;
pub mod node_service;

pub use error::NodeServiceError;
pub use node_service::NodeService;
