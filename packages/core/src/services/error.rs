//! Service Layer Error Types

use crate::db::StoreError;
use thiserror::Error;

/// Node service errors
#[derive(Error, Debug)]
pub enum NodeServiceError {
    /// Node not found by ID
    #[error("Node not found: {id}")]
    NodeNotFound { id: String },

    /// Insert referenced a parent that does not exist
    #[error("Invalid parent node: {parent_id}")]
    InvalidParent { parent_id: String },

    /// Store operation failed
    #[error(transparent)]
    Store(StoreError),
}

impl NodeServiceError {
    /// Create a node not found error
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound { id: id.into() }
    }

    /// Create an invalid parent error
    pub fn invalid_parent(parent_id: impl Into<String>) -> Self {
        Self::InvalidParent {
            parent_id: parent_id.into(),
        }
    }

    /// Whether the underlying store could not serve the request
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_unavailable())
    }
}

impl From<StoreError> for NodeServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidParent { parent_id } => Self::InvalidParent { parent_id },
            other => Self::Store(other),
        }
    }
}
