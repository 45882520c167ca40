//! Data Models
//!
//! - `NodeRecord` - flat record with a parent reference, as persisted
//! - `TreeNode` - assembled node with owned children, derived per read
//! - `DeleteResult` - outcome of a subtree deletion

mod node;

pub use node::{
    find_in_forest, forest_node_count, write_forest_json, DeleteResult, NodeRecord, TreeNode,
    MAX_SERIALIZE_DEPTH,
};
