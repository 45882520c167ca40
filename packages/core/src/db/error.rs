//! Store Error Types
//!
//! This module defines error types for record store operations: connection,
//! initialization, query failures and write-time integrity violations.

use std::path::PathBuf;
use thiserror::Error;

/// Record store errors
///
/// Most variants mean the store could not be reached or could not complete an
/// operation ([`StoreError::is_unavailable`]). `InvalidParent` and
/// `CorruptRecord` describe problems with the data instead.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Store could not serve the request
    #[error("Store unavailable: {context}")]
    Unavailable { context: String },

    /// Failed to establish database connection
    #[error("Failed to connect to database at {path}: {source}")]
    ConnectionFailed {
        path: PathBuf,
        source: libsql::Error,
    },

    /// Failed to initialize database schema
    #[error("Failed to initialize database schema: {0}")]
    InitializationFailed(String),

    /// Failed to create parent directory
    #[error("Failed to create parent directory for database: {0}")]
    DirectoryCreationFailed(#[from] std::io::Error),

    /// Insert referenced a parent that does not exist
    #[error("Parent node does not exist: {parent_id}")]
    InvalidParent { parent_id: String },

    /// Stored row could not be decoded into a record
    #[error("Corrupt record: {context}")]
    CorruptRecord { context: String },

    /// libsql operation error
    #[error("Database operation failed: {0}")]
    Libsql(#[from] libsql::Error),
}

impl StoreError {
    /// Create an unavailable error
    pub fn unavailable(context: impl Into<String>) -> Self {
        Self::Unavailable {
            context: context.into(),
        }
    }

    /// Create a connection failed error
    pub fn connection_failed(path: PathBuf, source: libsql::Error) -> Self {
        Self::ConnectionFailed { path, source }
    }

    /// Create an initialization failed error
    pub fn initialization_failed(msg: impl Into<String>) -> Self {
        Self::InitializationFailed(msg.into())
    }

    /// Create an invalid parent error
    pub fn invalid_parent(parent_id: impl Into<String>) -> Self {
        Self::InvalidParent {
            parent_id: parent_id.into(),
        }
    }

    /// Create a corrupt record error
    pub fn corrupt_record(context: impl Into<String>) -> Self {
        Self::CorruptRecord {
            context: context.into(),
        }
    }

    /// Whether this error means the store itself failed (as opposed to the
    /// request carrying bad data)
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Unavailable { .. }
                | Self::ConnectionFailed { .. }
                | Self::InitializationFailed(_)
                | Self::DirectoryCreationFailed(_)
                | Self::Libsql(_)
        )
    }
}
