//! HTTP error handling
//!
//! Every handler failure answers with the same JSON body:
//! `{ "message": ..., "code": ..., "details"?: ... }`. This includes request
//! bodies axum cannot parse, which become `VALIDATION_ERROR`. Unmatched routes
//! and methods keep axum's default empty responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use nodetree_core::services::NodeServiceError;
use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// HTTP error response body
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    /// User-facing error message
    pub message: String,
    /// Machine-readable error code
    pub code: String,
    /// Optional detailed error information for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl HttpError {
    /// Create a new HTTP error
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: None,
        }
    }

    /// Create a new HTTP error with details
    pub fn with_details(
        message: impl Into<String>,
        code: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: Some(details.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "NODE_NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" | "INVALID_PARENT" => StatusCode::BAD_REQUEST,
            "STORE_UNAVAILABLE" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<ValidationError> for HttpError {
    fn from(err: ValidationError) -> Self {
        HttpError::new(err.to_string(), "VALIDATION_ERROR")
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        HttpError::with_details(
            "Invalid request body",
            "VALIDATION_ERROR",
            rejection.body_text(),
        )
    }
}

impl From<NodeServiceError> for HttpError {
    fn from(err: NodeServiceError) -> Self {
        match err {
            NodeServiceError::NodeNotFound { id } => {
                HttpError::new(format!("Node not found: {}", id), "NODE_NOT_FOUND")
            }
            NodeServiceError::InvalidParent { parent_id } => HttpError::with_details(
                "Parent node does not exist",
                "INVALID_PARENT",
                format!("parent_id: {}", parent_id),
            ),
            NodeServiceError::Store(store_err) if store_err.is_unavailable() => {
                tracing::error!("Store unavailable: {:?}", store_err);
                HttpError::with_details(
                    "Storage is temporarily unavailable",
                    "STORE_UNAVAILABLE",
                    store_err.to_string(),
                )
            }
            NodeServiceError::Store(store_err) => {
                tracing::error!("Store error: {:?}", store_err);
                HttpError::with_details("Internal server error", "STORE_ERROR", store_err.to_string())
            }
        }
    }
}
