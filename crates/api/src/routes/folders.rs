//! Folder routes.

use axum::{
    Json, Router,
    extract::Path,
    http::StatusCode,
    routing::{get, post},
};
use boxmock_core::folder::ROOT_FOLDER_ID;
use boxmock_db::entities::folders;
use boxmock_db::repositories::{CreateFolderInput, UpdateFolderInput};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::files::FileResponse;
use super::{Collection, ItemRef, ParentRef, timestamp};
use crate::{AppState, error::ApiError, error::ApiResult, middleware::TenantScope};

/// Creates the folder routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/folders", post(create_folder))
        .route(
            "/folders/{folder_id}",
            get(get_folder).put(update_folder).delete(delete_folder),
        )
        .route("/folders/{folder_id}/items", get(get_folder_items))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a folder.
#[derive(Debug, Deserialize)]
pub struct CreateFolderRequest {
    /// Folder name.
    pub name: Option<String>,
    /// Parent folder; the root when omitted.
    #[serde(default)]
    pub parent: Option<ParentRef>,
}

/// Request body for updating a folder.
#[derive(Debug, Deserialize)]
pub struct UpdateFolderRequest {
    /// New name.
    pub name: Option<String>,
    /// New parent folder.
    pub parent: Option<ParentRef>,
}

/// Folder as returned to callers.
#[derive(Debug, Serialize)]
pub struct FolderResponse {
    /// Always `"folder"`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Folder ID.
    pub id: String,
    /// Folder name.
    pub name: String,
    /// Parent folder, `null` for the root.
    pub parent: Option<ItemRef>,
    /// Creation time (RFC 3339).
    pub created_at: String,
}

impl From<folders::Model> for FolderResponse {
    fn from(folder: folders::Model) -> Self {
        Self {
            kind: "folder",
            parent: folder.parent_id.map(ItemRef::folder),
            created_at: timestamp(&folder.created_at),
            id: folder.id,
            name: folder.name,
        }
    }
}

/// Entry of a folder listing.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum FolderItem {
    /// Subfolder.
    Folder(FolderResponse),
    /// File.
    File(FileResponse),
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/folders`
async fn create_folder(
    tenant: TenantScope,
    Json(payload): Json<CreateFolderRequest>,
) -> ApiResult<(StatusCode, Json<FolderResponse>)> {
    let Some(name) = payload.name else {
        return Err(ApiError::bad_request("Folder name is required"));
    };
    let parent_id = payload
        .parent
        .and_then(|p| p.id)
        .unwrap_or_else(|| ROOT_FOLDER_ID.to_string());

    let folder = tenant
        .folders()
        .create(CreateFolderInput { name, parent_id })
        .await?;

    info!(identity = %tenant.identity(), folder_id = %folder.id, "Folder created");
    Ok((StatusCode::CREATED, Json(folder.into())))
}

/// GET `/folders/{folder_id}`
async fn get_folder(
    tenant: TenantScope,
    Path(folder_id): Path<String>,
) -> ApiResult<Json<FolderResponse>> {
    let folder = tenant.folders().get(&folder_id).await?;
    Ok(Json(folder.into()))
}

/// PUT `/folders/{folder_id}`
async fn update_folder(
    tenant: TenantScope,
    Path(folder_id): Path<String>,
    Json(payload): Json<UpdateFolderRequest>,
) -> ApiResult<Json<FolderResponse>> {
    let parent_id = match payload.parent {
        Some(ParentRef { id: Some(id) }) => Some(id),
        Some(ParentRef { id: None }) => {
            return Err(ApiError::bad_request("Parent folder id is required"));
        }
        None => None,
    };

    let folder = tenant
        .folders()
        .update(
            &folder_id,
            UpdateFolderInput {
                name: payload.name,
                parent_id,
            },
        )
        .await?;
    Ok(Json(folder.into()))
}

/// DELETE `/folders/{folder_id}`
///
/// Removes the whole subtree, including file content.
async fn delete_folder(
    tenant: TenantScope,
    Path(folder_id): Path<String>,
) -> ApiResult<StatusCode> {
    tenant.folders().delete(&folder_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/folders/{folder_id}/items`
async fn get_folder_items(
    tenant: TenantScope,
    Path(folder_id): Path<String>,
) -> ApiResult<Json<Collection<FolderItem>>> {
    let items = tenant.folders().items(&folder_id).await?;

    let entries: Vec<FolderItem> = items
        .folders
        .into_iter()
        .map(|f| FolderItem::Folder(f.into()))
        .chain(items.files.into_iter().map(|f| FolderItem::File(f.into())))
        .collect();
    Ok(Json(entries.into()))
}
