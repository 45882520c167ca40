//! Node Endpoints
//!
//! # Endpoints
//!
//! - `GET /api/health` - Health check endpoint
//! - `GET /api/tree` - Whole hierarchy as a forest
//! - `POST /api/nodes` - Create a node
//! - `PUT /api/nodes/:id` - Rename a node
//! - `DELETE /api/nodes/:id` - Delete a node and its subtree

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use nodetree_core::models::{write_forest_json, NodeRecord};
use serde::{Deserialize, Serialize};

use crate::http_error::HttpError;
use crate::validation::validate_name;
use crate::AppState;

/// Body of `POST /api/nodes`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNodeRequest {
    pub name: Option<String>,
    #[serde(default, alias = "parent")]
    pub parent_id: Option<String>,
}

/// Body of `PUT /api/nodes/:id`
#[derive(Debug, Deserialize)]
pub struct RenameNodeRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteNodeResponse {
    pub message: String,
    pub deleted_count: u64,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
///
/// # Example
///
/// ```bash
/// curl http://localhost:5000/api/health
/// ```
async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Get the whole hierarchy
///
/// Roots first, each with nested `children`. The body is written with
/// [`write_forest_json`] so hierarchy depth is not bounded by the stack.
async fn get_tree(State(state): State<AppState>) -> Result<Response, HttpError> {
    let forest = state.node_service.get_tree().await?;

    let mut body = Vec::new();
    write_forest_json(&forest, &mut body).map_err(|e| {
        tracing::error!("Failed to encode tree: {}", e);
        HttpError::with_details("Failed to encode tree", "ENCODING_ERROR", e.to_string())
    })?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// Create a node
///
/// An absent, null or empty `parentId` creates a root.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:5000/api/nodes \
///   -H "Content-Type: application/json" \
///   -d '{"name": "Garden", "parentId": null}'
/// ```
async fn create_node(
    State(state): State<AppState>,
    payload: Result<Json<CreateNodeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<NodeRecord>), HttpError> {
    let Json(request) = payload?;
    let name = validate_name(request.name.as_deref())?;
    let parent_id = request.parent_id.as_deref().filter(|p| !p.is_empty());

    let record = state
        .node_service
        .create_node(&name, parent_id)
        .await
        .map_err(|e| {
            tracing::warn!("Node creation failed: {}", e);
            HttpError::from(e)
        })?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// Rename a node
///
/// # Example
///
/// ```bash
/// curl -X PUT http://localhost:5000/api/nodes/<id> \
///   -H "Content-Type: application/json" \
///   -d '{"name": "Vegetables"}'
/// ```
async fn rename_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<RenameNodeRequest>, JsonRejection>,
) -> Result<Json<NodeRecord>, HttpError> {
    let Json(request) = payload?;
    let name = validate_name(request.name.as_deref())?;
    let record = state.node_service.rename_node(&id, &name).await?;
    Ok(Json(record))
}

/// Delete a node and everything below it
///
/// Deleting an unknown id succeeds with `deletedCount: 0`.
async fn delete_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteNodeResponse>, HttpError> {
    let result = state.node_service.delete_subtree(&id).await.map_err(|e| {
        tracing::error!("Delete of {} failed: {}", id, e);
        HttpError::from(e)
    })?;

    Ok(Json(DeleteNodeResponse {
        message: "Node deleted".to_string(),
        deleted_count: result.deleted_count,
    }))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/tree", get(get_tree))
        .route("/api/nodes", post(create_node))
        .route("/api/nodes/:id", put(rename_node).delete(delete_node))
        .with_state(state)
}
