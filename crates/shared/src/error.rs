//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Client errors (`NotFound`, `Forbidden`, `BadRequest`, `Conflict`) are
/// reported to callers as structured error bodies. The remaining variants are
/// server-side failures that propagate unchanged so the caller may retry the
/// whole request.
#[derive(Debug, Error)]
pub enum AppError {
    /// Referenced folder, file, user or sign request is absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation not permitted on the target (e.g. the root folder).
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Malformed request or missing upload content.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Name collision.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Tenant storage could not be created or opened.
    #[error("Storage initialization failed: {0}")]
    StorageInit(String),

    /// Blob read, write or delete failed.
    #[error("I/O failure: {0}")]
    Io(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Forbidden(_) => 403,
            Self::BadRequest(_) => 400,
            Self::Conflict(_) => 409,
            Self::StorageInit(_) | Self::Io(_) | Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the stable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Forbidden(_) => "forbidden",
            Self::BadRequest(_) => "bad_request",
            Self::Conflict(_) => "item_name_in_use",
            Self::StorageInit(_) => "storage_init_failure",
            Self::Io(_) => "io_failure",
            Self::Database(_) => "database_error",
            Self::Internal(_) => "internal_server_error",
        }
    }

    /// Returns the caller-facing message without the category prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(m)
            | Self::Forbidden(m)
            | Self::BadRequest(m)
            | Self::Conflict(m)
            | Self::StorageInit(m)
            | Self::Io(m)
            | Self::Database(m)
            | Self::Internal(m) => m,
        }
    }

    /// Whether this error is the caller's fault.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::NotFound(String::new()), 404, "not_found")]
    #[case(AppError::Forbidden(String::new()), 403, "forbidden")]
    #[case(AppError::BadRequest(String::new()), 400, "bad_request")]
    #[case(AppError::Conflict(String::new()), 409, "item_name_in_use")]
    #[case(AppError::StorageInit(String::new()), 500, "storage_init_failure")]
    #[case(AppError::Io(String::new()), 500, "io_failure")]
    #[case(AppError::Database(String::new()), 500, "database_error")]
    #[case(AppError::Internal(String::new()), 500, "internal_server_error")]
    fn test_status_and_code(#[case] err: AppError, #[case] status: u16, #[case] code: &str) {
        assert_eq!(err.status_code(), status);
        assert_eq!(err.error_code(), code);
        assert_eq!(err.is_client_error(), status < 500);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::NotFound("Folder not found".into()).to_string(),
            "Not found: Folder not found"
        );
        assert_eq!(
            AppError::Forbidden("msg".into()).to_string(),
            "Access denied: msg"
        );
        assert_eq!(
            AppError::StorageInit("disk full".into()).to_string(),
            "Storage initialization failed: disk full"
        );
    }

    #[test]
    fn test_message_strips_prefix() {
        let err = AppError::Forbidden("Cannot delete root folder".into());
        assert_eq!(err.message(), "Cannot delete root folder");
    }
}
