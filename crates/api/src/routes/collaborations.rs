//! Collaboration routes.
//!
//! Collaborations are not stored: creation echoes the request back with a
//! fresh ID and lookups return a fixed record.

use axum::{
    Json, Router,
    extract::Path,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{AppState, middleware::TenantScope};

/// Creates the collaboration routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/collaborations", post(create_collaboration))
        .route(
            "/collaborations/{collaboration_id}",
            get(get_collaboration).delete(delete_collaboration),
        )
}

/// Request body for creating a collaboration.
#[derive(Debug, Deserialize)]
pub struct CreateCollaborationRequest {
    /// Shared item.
    #[serde(default)]
    pub item: Option<Value>,
    /// Collaborator.
    #[serde(default)]
    pub accessible_by: Option<Value>,
    /// Granted role.
    pub role: Option<String>,
    /// Whether the collaborator sees the parent path.
    #[serde(default)]
    pub can_view_path: bool,
}

/// POST `/collaborations`
async fn create_collaboration(
    _tenant: TenantScope,
    Json(payload): Json<CreateCollaborationRequest>,
) -> (StatusCode, Json<Value>) {
    (
        StatusCode::CREATED,
        Json(json!({
            "type": "collaboration",
            "id": Uuid::new_v4().to_string(),
            "item": payload.item.unwrap_or_else(|| json!({})),
            "accessible_by": payload.accessible_by.unwrap_or_else(|| json!({})),
            "role": payload.role.unwrap_or_else(|| "editor".to_string()),
            "can_view_path": payload.can_view_path,
        })),
    )
}

/// GET `/collaborations/{collaboration_id}`
async fn get_collaboration(
    _tenant: TenantScope,
    Path(collaboration_id): Path<String>,
) -> Json<Value> {
    Json(json!({
        "type": "collaboration",
        "id": collaboration_id,
        "item": { "type": "folder", "id": "0" },
        "accessible_by": { "type": "user", "id": "unknown" },
        "role": "editor",
    }))
}

/// DELETE `/collaborations/{collaboration_id}`
async fn delete_collaboration(_tenant: TenantScope) -> StatusCode {
    StatusCode::NO_CONTENT
}
