//! Sign request routes.

use axum::{
    Json, Router,
    extract::Path,
    http::StatusCode,
    routing::{get, post},
};
use boxmock_core::sign::{SignFile, Signer, SignerInput, SourceFileInput};
use boxmock_db::entities::sign_requests;
use boxmock_db::repositories::CreateSignRequestInput;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ItemRef, ParentRef, timestamp};
use crate::{AppState, error::ApiError, error::ApiResult, middleware::TenantScope};

/// Creates the sign request routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sign_requests", post(create_sign_request))
        .route("/sign_requests/{sign_request_id}", get(get_sign_request))
}

/// Request body for creating a sign request.
#[derive(Debug, Deserialize)]
pub struct CreateSignRequestRequest {
    /// Documents to sign.
    #[serde(default)]
    pub source_files: Vec<SourceFileInput>,
    /// Signers to invite.
    #[serde(default)]
    pub signers: Vec<SignerInput>,
    /// Folder receiving the signed documents.
    pub parent_folder: Option<ParentRef>,
    /// Where signers land after signing.
    pub redirect_url: Option<String>,
}

/// Sign request as returned to callers.
#[derive(Debug, Serialize)]
pub struct SignRequestResponse {
    /// Always `"sign-request"`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Sign request ID.
    pub id: String,
    /// Status.
    pub status: String,
    /// Invited signers.
    pub signers: Vec<Signer>,
    /// Generated documents.
    pub sign_files: SignFiles,
    /// Folder receiving the signed documents.
    pub parent_folder: Option<ItemRef>,
    /// Creation time (RFC 3339).
    pub created_at: String,
}

/// Wrapper around generated documents.
#[derive(Debug, Serialize)]
pub struct SignFiles {
    /// Generated documents.
    pub files: Vec<SignFile>,
}

impl From<sign_requests::Model> for SignRequestResponse {
    fn from(model: sign_requests::Model) -> Self {
        Self {
            kind: "sign-request",
            signers: model.signers(),
            sign_files: SignFiles {
                files: model.files(),
            },
            parent_folder: model.parent_folder_id.map(ItemRef::folder),
            created_at: timestamp(&model.created_at),
            id: model.id,
            status: model.status,
        }
    }
}

/// POST `/sign_requests`
async fn create_sign_request(
    tenant: TenantScope,
    Json(payload): Json<CreateSignRequestRequest>,
) -> ApiResult<(StatusCode, Json<SignRequestResponse>)> {
    let sign_request = tenant
        .sign_requests()
        .create(CreateSignRequestInput {
            signers: payload.signers,
            source_files: payload.source_files,
            parent_folder_id: payload.parent_folder.and_then(|p| p.id),
            redirect_url: payload.redirect_url,
        })
        .await?;

    info!(identity = %tenant.identity(), sign_request_id = %sign_request.id, "Sign request issued");
    Ok((StatusCode::CREATED, Json(sign_request.into())))
}

/// GET `/sign_requests/{sign_request_id}`
async fn get_sign_request(
    tenant: TenantScope,
    Path(sign_request_id): Path<String>,
) -> ApiResult<Json<SignRequestResponse>> {
    tenant
        .sign_requests()
        .find_by_id(&sign_request_id)
        .await?
        .map(|sr| Json(sr.into()))
        .ok_or_else(|| ApiError::not_found("Sign request not found"))
}
