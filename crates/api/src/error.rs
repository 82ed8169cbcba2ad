//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use boxmock_core::storage::StorageError;
use boxmock_db::TenantError;
use boxmock_db::repositories::{FileError, FolderError};
use boxmock_shared::AppError;
use sea_orm::DbErr;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::error;

/// Error body returned to callers.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always `"error"`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// HTTP status code.
    pub status: u16,
    /// Error code for programmatic handling.
    pub code: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Extra detail, such as name conflicts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_info: Option<Value>,
}

/// API error type.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct ApiError {
    error: AppError,
    context_info: Option<Value>,
}

impl ApiError {
    /// Attach context info to the error body.
    #[must_use]
    pub fn with_context(mut self, context_info: Value) -> Self {
        self.context_info = Some(context_info);
        self
    }

    /// Not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into()).into()
    }

    /// Bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into()).into()
    }

    /// The underlying application error.
    #[must_use]
    pub fn app_error(&self) -> &AppError {
        &self.error
    }

    /// Get the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self {
            error,
            context_info: None,
        }
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        AppError::Database(err.to_string()).into()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        AppError::Io(err.to_string()).into()
    }
}

impl From<TenantError> for ApiError {
    fn from(err: TenantError) -> Self {
        match err {
            TenantError::StorageInit { .. } => AppError::StorageInit(err.to_string()).into(),
            TenantError::Database(e) => e.into(),
            TenantError::Storage(e) => e.into(),
        }
    }
}

impl From<FolderError> for ApiError {
    fn from(err: FolderError) -> Self {
        match err {
            FolderError::NotFound(_) => Self::not_found("Folder not found"),
            FolderError::ParentNotFound(_) => Self::not_found("Parent folder not found"),
            FolderError::DeleteRoot => AppError::Forbidden("Cannot delete root folder".into()).into(),
            FolderError::ModifyRoot => AppError::Forbidden("Cannot modify root folder".into()).into(),
            FolderError::MoveIntoSubtree { .. } => Self::bad_request(err.to_string()),
            FolderError::Database(e) => e.into(),
            FolderError::Storage(e) => e.into(),
        }
    }
}

impl From<FileError> for ApiError {
    fn from(err: FileError) -> Self {
        match err {
            FileError::NotFound(_) => Self::not_found("File not found"),
            FileError::FolderNotFound(_) => Self::not_found("Parent folder not found"),
            FileError::ContentNotFound(_) => Self::not_found("File content not found"),
            FileError::EmptyContent => Self::bad_request("No file provided"),
            FileError::NameInUse { id, name } => {
                Self::from(AppError::Conflict(format!(
                    "Item with name '{name}' already exists"
                )))
                .with_context(json!({ "conflicts": [{ "id": id, "name": name }] }))
            }
            FileError::Database(e) => e.into(),
            FileError::Storage(e) => e.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if !self.error.is_client_error() {
            error!(code = self.error.error_code(), error = %self.error, "Request failed");
        }

        let body = ErrorResponse {
            kind: "error",
            status: status.as_u16(),
            code: self.error.error_code(),
            message: self.error.message().to_string(),
            context_info: self.context_info,
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(FolderError::DeleteRoot, 403, "forbidden")]
    #[case(FolderError::ModifyRoot, 403, "forbidden")]
    #[case(FolderError::NotFound("x".into()), 404, "not_found")]
    #[case(FolderError::MoveIntoSubtree { folder_id: "a".into(), parent_id: "b".into() }, 400, "bad_request")]
    fn test_folder_error_mapping(
        #[case] err: FolderError,
        #[case] status: u16,
        #[case] code: &str,
    ) {
        let api: ApiError = err.into();
        assert_eq!(api.status_code().as_u16(), status);
        assert_eq!(api.app_error().error_code(), code);
    }

    #[test]
    fn test_name_in_use_carries_conflicts() {
        let api: ApiError = FileError::NameInUse {
            id: "f1".into(),
            name: "a.txt".into(),
        }
        .into();

        assert_eq!(api.status_code(), StatusCode::CONFLICT);
        assert_eq!(api.app_error().error_code(), "item_name_in_use");
        let context = api.context_info.unwrap();
        assert_eq!(context["conflicts"][0]["id"], "f1");
        assert_eq!(context["conflicts"][0]["name"], "a.txt");
    }

    #[test]
    fn test_storage_init_is_server_error() {
        let identity = boxmock_shared::Identity::new("x");
        let api: ApiError = TenantError::storage_init(&identity, "disk full").into();
        assert_eq!(api.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.app_error().error_code(), "storage_init_failure");
    }
}
