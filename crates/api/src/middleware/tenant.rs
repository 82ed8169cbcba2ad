//! Per-request tenant scope.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use boxmock_db::TenantConnection;
use boxmock_shared::{AppError, Identity};
use tracing::{debug, warn};

use crate::{AppState, error::ApiError};

/// Resolves the caller's identity from the `Authorization` header.
pub fn resolve_identity(headers: &HeaderMap) -> Identity {
    let header = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok());
    Identity::from_authorization(header)
}

/// Opens the caller's tenant connection around the request.
///
/// This middleware:
/// 1. Resolves the identity from the Authorization header
/// 2. Gets (or lazily creates) the tenant's storage
/// 3. Opens a fresh connection and stores it in request extensions
/// 4. Closes the connection once the handler's response is ready
pub async fn tenant_scope(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = resolve_identity(request.headers());
    debug!(
        method = %request.method(),
        path = %request.uri().path(),
        identity = %identity,
        "Tenant request"
    );

    let connection = match open(&state, &identity).await {
        Ok(connection) => Arc::new(connection),
        Err(e) => return e.into_response(),
    };

    request.extensions_mut().insert(Arc::clone(&connection));
    let response = next.run(request).await;

    // Handlers hold their clone only for the request, so this is the last one.
    match Arc::try_unwrap(connection) {
        Ok(connection) => {
            if let Err(e) = connection.close().await {
                warn!(identity = %identity, error = %e, "Failed to close tenant connection");
            }
        }
        Err(_) => warn!(identity = %identity, "Tenant connection still shared after request"),
    }

    response
}

async fn open(state: &AppState, identity: &Identity) -> Result<TenantConnection, ApiError> {
    let handle = state.registry.get_or_create(identity).await?;
    Ok(handle.connect().await?)
}

/// Extractor for the request's tenant connection.
///
/// Use this in handlers under the tenant scope:
///
/// ```ignore
/// async fn handler(tenant: TenantScope) -> ApiResult<Json<Value>> {
///     let root = tenant.folders().get("0").await?;
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TenantScope(pub Arc<TenantConnection>);

impl std::ops::Deref for TenantScope {
    type Target = TenantConnection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for TenantScope
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Arc<TenantConnection>>()
            .cloned()
            .map(TenantScope)
            .ok_or_else(|| AppError::Internal("Tenant scope is not installed".into()).into())
    }
}
