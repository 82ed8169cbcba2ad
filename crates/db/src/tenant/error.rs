//! Tenant error types.

use boxmock_core::storage::StorageError;
use boxmock_shared::Identity;
use sea_orm::DbErr;
use thiserror::Error;

/// Errors from tenant creation, connection and reset.
#[derive(Debug, Error)]
pub enum TenantError {
    /// The tenant's on-disk storage could not be created or opened.
    ///
    /// Nothing is cached on this error; the next access retries.
    #[error("storage initialization failed for identity '{identity}': {reason}")]
    StorageInit {
        /// Identity whose storage failed.
        identity: Identity,
        /// Underlying cause.
        reason: String,
    },

    /// Database error on an initialized tenant.
    #[error("database error: {0}")]
    Database(#[from] DbErr),

    /// Blob storage error on an initialized tenant.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl TenantError {
    /// Create a storage initialization error.
    #[must_use]
    pub fn storage_init(identity: &Identity, reason: impl ToString) -> Self {
        Self::StorageInit {
            identity: identity.clone(),
            reason: reason.to_string(),
        }
    }
}
