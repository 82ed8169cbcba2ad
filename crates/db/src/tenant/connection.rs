//! Request-scoped tenant connection.
//!
//! # Usage
//!
//! ```ignore
//! let conn = handle.connect().await?;
//!
//! let folder = conn.folders().get("0").await?;
//!
//! // Release when the request is done
//! conn.close().await?;
//! ```

use boxmock_core::storage::BlobStore;
use boxmock_shared::Identity;
use sea_orm::{DatabaseConnection, DbErr};
use tokio::sync::OwnedRwLockReadGuard;
use tracing::debug;

use crate::repositories::{
    FileRepository, FolderRepository, SignRequestRepository, UserRepository,
};

/// A connection owned by a single request.
///
/// While it is alive, the tenant cannot be reset. Dropping it without
/// calling [`TenantConnection::close`] still releases everything, just not
/// synchronously.
pub struct TenantConnection {
    identity: Identity,
    db: DatabaseConnection,
    blobs: BlobStore,
    _reset_guard: OwnedRwLockReadGuard<()>,
}

impl TenantConnection {
    pub(super) fn new(
        identity: Identity,
        db: DatabaseConnection,
        blobs: BlobStore,
        reset_guard: OwnedRwLockReadGuard<()>,
    ) -> Self {
        Self {
            identity,
            db,
            blobs,
            _reset_guard: reset_guard,
        }
    }

    /// Identity this connection belongs to.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// The underlying database connection.
    #[must_use]
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// The tenant's blob store.
    #[must_use]
    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    /// Folder operations.
    #[must_use]
    pub fn folders(&self) -> FolderRepository {
        FolderRepository::new(self.db.clone(), self.blobs.clone())
    }

    /// File operations.
    #[must_use]
    pub fn files(&self) -> FileRepository {
        FileRepository::new(self.db.clone(), self.blobs.clone())
    }

    /// User operations.
    #[must_use]
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.db.clone())
    }

    /// Sign request operations.
    #[must_use]
    pub fn sign_requests(&self) -> SignRequestRepository {
        SignRequestRepository::new(self.db.clone())
    }

    /// Closes the connection and releases the tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails to close cleanly.
    pub async fn close(self) -> Result<(), DbErr> {
        self.db.close().await?;
        debug!(identity = %self.identity, "Tenant connection closed");
        Ok(())
    }
}

impl std::fmt::Debug for TenantConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantConnection")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}
