//! Tenant reset.

use boxmock_shared::Identity;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, TransactionTrait};
use tracing::{info, warn};

use super::error::TenantError;
use super::handle::TenantHandle;
use crate::migration::{DROP_SQL, SCHEMA_SQL};
use crate::repositories::folder::ensure_root;

/// Outcome of a tenant reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetSummary {
    /// Identity that was reset.
    pub identity: Identity,
    /// Blobs deleted from the tenant's `files/` directory.
    pub blobs_removed: usize,
}

impl TenantHandle {
    /// Wipes every record and blob of this tenant, leaving only the root
    /// folder.
    ///
    /// Waits for open connections to be released and holds off new ones until
    /// done. The handle stays valid and cached afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be recreated or blobs cannot be
    /// removed.
    pub async fn reset(&self) -> Result<ResetSummary, TenantError> {
        let _exclusive = self.gate.write().await;

        let db = self.open().await?;
        let recreated = recreate_schema(&db).await;
        if let Err(e) = db.close().await {
            warn!(identity = %self.identity(), error = %e, "Failed to close reset connection");
        }
        recreated?;

        let blobs_removed = self.blobs().clear().await?;

        info!(identity = %self.identity(), blobs_removed, "Tenant reset");
        Ok(ResetSummary {
            identity: self.identity().clone(),
            blobs_removed,
        })
    }
}

async fn recreate_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let txn = db.begin().await?;
    txn.execute_unprepared(DROP_SQL).await?;
    txn.execute_unprepared(SCHEMA_SQL).await?;
    ensure_root(&txn).await?;
    txn.commit().await
}
