//! Administrative routes: tenant reset and the storage browser.

use axum::{
    Form, Json, Router,
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::{HeaderMap, header::CONTENT_TYPE},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use boxmock_core::folder::FolderTree;
use boxmock_core::sign::Signer;
use boxmock_db::TenantConnection;
use boxmock_shared::{AppError, Identity};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{AppState, error::ApiError, error::ApiResult, middleware::resolve_identity};

/// Creates the admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/_reset", post(reset_tenant))
        .route("/_browse", get(browse))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Reset request, as JSON or form body.
#[derive(Debug, Default, Deserialize)]
pub struct ResetRequest {
    /// Identity to reset; the caller's identity when blank or omitted.
    pub identity: Option<String>,
}

impl ResetRequest {
    fn target(self, headers: &HeaderMap) -> Identity {
        match self.identity {
            Some(value) if !value.trim().is_empty() => Identity::new(&value),
            _ => resolve_identity(headers),
        }
    }
}

/// Reset result for JSON callers.
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    /// Always `"reset complete"`.
    pub status: &'static str,
    /// Identity that was reset.
    pub identity: Identity,
}

/// Snapshot of every tenant with storage on disk.
#[derive(Debug, Serialize)]
pub struct BrowseResponse {
    /// One entry per identity.
    pub identities: Vec<IdentitySnapshot>,
}

/// Snapshot of one tenant.
#[derive(Debug, Serialize)]
pub struct IdentitySnapshot {
    /// Identity.
    pub name: Identity,
    /// Folder tree from the root, files included.
    pub tree: FolderTree,
    /// Users.
    pub users: Vec<UserSummary>,
    /// Sign requests.
    pub sign_requests: Vec<SignRequestSummary>,
}

/// User line of a snapshot.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    /// User ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: Option<String>,
}

/// Sign request line of a snapshot.
#[derive(Debug, Serialize)]
pub struct SignRequestSummary {
    /// Sign request ID.
    pub id: String,
    /// Status.
    pub status: String,
    /// Invited signers.
    pub signers: Vec<Signer>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/_reset`
///
/// Form posts (from the browser) are redirected to `/_browse`; every other
/// body is read as JSON and answered with JSON.
async fn reset_tenant(State(state): State<AppState>, request: Request) -> ApiResult<Response> {
    let headers = request.headers().clone();

    if is_form(&headers) {
        let Form(payload) = Form::<ResetRequest>::from_request(request, &state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        let identity = payload.target(&headers);
        state.registry.reset(&identity).await?;
        return Ok(Redirect::to("/_browse").into_response());
    }

    let body = Bytes::from_request(request, &state)
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?;
    let payload: ResetRequest = if body.is_empty() {
        ResetRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(format!("Invalid reset request: {e}")))?
    };

    let identity = payload.target(&headers);
    state.registry.reset(&identity).await?;

    Ok(Json(ResetResponse {
        status: "reset complete",
        identity,
    })
    .into_response())
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"))
}

/// GET `/_browse`
async fn browse(State(state): State<AppState>) -> ApiResult<Json<BrowseResponse>> {
    let identities = state
        .registry
        .known_identities()
        .await
        .map_err(|e| ApiError::from(AppError::Io(e.to_string())))?;

    let mut snapshots = Vec::with_capacity(identities.len());
    for identity in identities {
        let handle = state.registry.get_or_create(&identity).await?;
        let connection = handle.connect().await?;
        let snapshot = snapshot(&connection).await;
        if let Err(e) = connection.close().await {
            warn!(identity = %identity, error = %e, "Failed to close tenant connection");
        }
        snapshots.push(snapshot?);
    }

    info!(identities = snapshots.len(), "Browse snapshot taken");
    Ok(Json(BrowseResponse {
        identities: snapshots,
    }))
}

async fn snapshot(connection: &TenantConnection) -> ApiResult<IdentitySnapshot> {
    let tree = connection.folders().tree().await?;
    let users = connection
        .users()
        .list(None)
        .await?
        .into_iter()
        .map(|u| UserSummary {
            id: u.id,
            name: u.name,
            email: u.email,
        })
        .collect();
    let sign_requests = connection
        .sign_requests()
        .list()
        .await?
        .into_iter()
        .map(|sr| SignRequestSummary {
            signers: sr.signers(),
            id: sr.id,
            status: sr.status,
        })
        .collect();

    Ok(IdentitySnapshot {
        name: connection.identity().clone(),
        tree,
        users,
        sign_requests,
    })
}
