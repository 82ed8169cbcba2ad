//! File routes.

use axum::{
    Json, Router,
    extract::{Multipart, Path},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use boxmock_core::folder::ROOT_FOLDER_ID;
use boxmock_db::entities::files;
use boxmock_db::repositories::{CopyFileInput, DEFAULT_FILE_NAME, UploadFileInput};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use super::{Entries, ItemRef, ParentRef, timestamp};
use crate::{AppState, error::ApiError, error::ApiResult, middleware::TenantScope};

/// Creates the file routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/files/content", post(upload_file))
        .route("/files/upload_sessions", post(preflight_check))
        .route(
            "/files/{file_id}",
            get(get_file).put(update_file).delete(delete_file),
        )
        .route(
            "/files/{file_id}/content",
            get(download_file).post(upload_file_version),
        )
        .route("/files/{file_id}/copy", post(copy_file))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// File as returned to callers.
#[derive(Debug, Serialize)]
pub struct FileResponse {
    /// Always `"file"`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// File ID.
    pub id: String,
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub size: i64,
    /// Owning folder.
    pub parent: ItemRef,
    /// Current version.
    pub file_version: FileVersion,
    /// Creation time (RFC 3339).
    pub created_at: String,
}

/// Version descriptor of a file.
#[derive(Debug, Serialize)]
pub struct FileVersion {
    /// `"{file id}_v{version}"`.
    pub id: String,
    /// Version counter, starting at 1.
    pub version_number: i32,
}

impl From<files::Model> for FileResponse {
    fn from(file: files::Model) -> Self {
        Self {
            kind: "file",
            file_version: FileVersion {
                id: format!("{}_v{}", file.id, file.version),
                version_number: file.version,
            },
            parent: ItemRef::folder(file.folder_id),
            created_at: timestamp(&file.created_at),
            size: file.size,
            id: file.id,
            name: file.name,
        }
    }
}

/// `attributes` part of an upload.
#[derive(Debug, Default, Deserialize)]
pub struct UploadAttributes {
    /// File name.
    pub name: Option<String>,
    /// Destination folder.
    pub parent: Option<ParentRef>,
}

/// Request body for renaming a file.
#[derive(Debug, Deserialize)]
pub struct UpdateFileRequest {
    /// New name.
    pub name: Option<String>,
}

/// Request body for copying a file.
#[derive(Debug, Default, Deserialize)]
pub struct CopyFileRequest {
    /// Destination folder; the source's folder when omitted.
    pub parent: Option<ParentRef>,
    /// Name of the copy; the source's name when omitted.
    pub name: Option<String>,
}

/// Request body for an upload preflight check.
#[derive(Debug, Deserialize)]
pub struct PreflightRequest {
    /// Name the upload would use.
    pub name: Option<String>,
    /// Destination folder.
    pub parent: Option<ParentRef>,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Upload form contents.
#[derive(Debug, Default)]
struct UploadForm {
    attributes: UploadAttributes,
    content: Option<Bytes>,
}

/// Reads the `attributes` JSON part and the first non-empty file part.
async fn read_upload_form(mut multipart: Multipart) -> ApiResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() == Some("attributes") {
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            form.attributes = serde_json::from_str(&text)
                .map_err(|e| ApiError::bad_request(format!("Invalid attributes: {e}")))?;
        } else if field.file_name().is_some() && form.content.is_none() {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            if !bytes.is_empty() {
                form.content = Some(bytes);
            }
        }
    }

    Ok(form)
}

fn parent_id_or_root(parent: Option<ParentRef>) -> String {
    parent
        .and_then(|p| p.id)
        .unwrap_or_else(|| ROOT_FOLDER_ID.to_string())
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/files/{file_id}`
async fn get_file(
    tenant: TenantScope,
    Path(file_id): Path<String>,
) -> ApiResult<Json<FileResponse>> {
    let file = tenant.files().get(&file_id).await?;
    Ok(Json(file.into()))
}

/// PUT `/files/{file_id}`
async fn update_file(
    tenant: TenantScope,
    Path(file_id): Path<String>,
    Json(payload): Json<UpdateFileRequest>,
) -> ApiResult<Json<FileResponse>> {
    let file = match payload.name {
        Some(name) => tenant.files().rename(&file_id, name).await?,
        None => tenant.files().get(&file_id).await?,
    };
    Ok(Json(file.into()))
}

/// DELETE `/files/{file_id}`
async fn delete_file(tenant: TenantScope, Path(file_id): Path<String>) -> ApiResult<StatusCode> {
    tenant.files().delete(&file_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/files/{file_id}/content`
async fn download_file(tenant: TenantScope, Path(file_id): Path<String>) -> ApiResult<Response> {
    let (file, content) = tenant.files().content(&file_id).await?;
    let filename: String = file
        .name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();
    let disposition = format!("attachment; filename=\"{filename}\"");

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        content,
    )
        .into_response())
}

/// POST `/files/content`
///
/// Multipart upload of a new file.
async fn upload_file(
    tenant: TenantScope,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Entries<FileResponse>>)> {
    let form = read_upload_form(multipart).await?;

    let file = tenant
        .files()
        .upload(UploadFileInput {
            name: form
                .attributes
                .name
                .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string()),
            folder_id: parent_id_or_root(form.attributes.parent),
            content: form.content.unwrap_or_default(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Entries {
            entries: vec![file.into()],
        }),
    ))
}

/// POST `/files/{file_id}/content`
///
/// Multipart upload of a new version.
async fn upload_file_version(
    tenant: TenantScope,
    Path(file_id): Path<String>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Entries<FileResponse>>)> {
    let form = read_upload_form(multipart).await?;
    let files = tenant.files();

    // An absent file reports 404 even when the upload is also empty.
    files.get(&file_id).await?;
    let file = files
        .upload_version(&file_id, form.content.unwrap_or_default())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Entries {
            entries: vec![file.into()],
        }),
    ))
}

/// POST `/files/{file_id}/copy`
async fn copy_file(
    tenant: TenantScope,
    Path(file_id): Path<String>,
    payload: Option<Json<CopyFileRequest>>,
) -> ApiResult<(StatusCode, Json<FileResponse>)> {
    let Json(payload) = payload.unwrap_or_default();

    let file = tenant
        .files()
        .copy(
            &file_id,
            CopyFileInput {
                folder_id: payload.parent.and_then(|p| p.id),
                name: payload.name,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(file.into())))
}

/// POST `/files/upload_sessions`
///
/// Preflight check: fails with `item_name_in_use` if the name is taken.
async fn preflight_check(
    tenant: TenantScope,
    Json(payload): Json<PreflightRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let folder_id = parent_id_or_root(payload.parent);
    let name = payload.name.unwrap_or_default();

    tenant.files().preflight(&name, &folder_id).await?;

    debug!(folder_id = %folder_id, name = %name, "Preflight passed");
    Ok(Json(json!({ "upload_token": Uuid::new_v4().to_string() })))
}
