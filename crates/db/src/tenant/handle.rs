//! Tenant handle: one identity's database and blob store.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use boxmock_core::storage::BlobStore;
use boxmock_shared::Identity;
use boxmock_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::connection::TenantConnection;
use super::error::TenantError;
use crate::migration::Migrator;
use crate::repositories::folder::ensure_root;

/// Name of the SQLite file inside each tenant directory.
pub const DATABASE_FILE: &str = "box.db";

/// How tenant connections are opened.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    /// Maximum time to wait when opening a connection.
    pub connect_timeout: Duration,
    /// Whether sqlx logs every statement.
    pub sqlx_logging: bool,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            sqlx_logging: false,
        }
    }
}

impl From<&DatabaseConfig> for ConnectionSettings {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            sqlx_logging: config.sqlx_logging,
        }
    }
}

/// Storage resources of one identity.
///
/// A handle does not hold an open connection. It holds the options to open
/// one, and every request gets its own via [`TenantHandle::connect`]. The
/// reset gate is shared by those connections (read side) and reset (write
/// side).
pub struct TenantHandle {
    identity: Identity,
    root: PathBuf,
    options: ConnectOptions,
    blobs: BlobStore,
    pub(super) gate: Arc<RwLock<()>>,
}

impl TenantHandle {
    /// Creates the tenant's storage under `data_dir` if missing and returns a
    /// handle to it.
    ///
    /// Safe to run against storage left by an earlier run or an earlier failed
    /// attempt: the schema uses `IF NOT EXISTS` and the root folder is inserted
    /// only when absent.
    ///
    /// # Errors
    ///
    /// Returns [`TenantError::StorageInit`] if any step fails.
    pub async fn create(
        identity: Identity,
        data_dir: &Path,
        settings: &ConnectionSettings,
    ) -> Result<Self, TenantError> {
        let root = data_dir.join(identity.dir_name());
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| TenantError::storage_init(&identity, e))?;

        let blobs = BlobStore::open(&root)
            .await
            .map_err(|e| TenantError::storage_init(&identity, e))?;

        let options = connect_options(&root.join(DATABASE_FILE), settings);
        let db = Database::connect(options.clone())
            .await
            .map_err(|e| TenantError::storage_init(&identity, e))?;

        let initialized = initialize(&db).await;
        let closed = db.close().await;
        initialized.map_err(|e| TenantError::storage_init(&identity, e))?;
        closed.map_err(|e| TenantError::storage_init(&identity, e))?;

        info!(identity = %identity, root = %root.display(), "Tenant storage ready");

        Ok(Self {
            identity,
            root,
            options,
            blobs,
            gate: Arc::new(RwLock::new(())),
        })
    }

    /// Opens a fresh connection for one request.
    ///
    /// Waits while a reset of this tenant is running.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub async fn connect(&self) -> Result<TenantConnection, TenantError> {
        let guard = Arc::clone(&self.gate).read_owned().await;
        let db = self.open().await?;
        debug!(identity = %self.identity, "Tenant connection opened");
        Ok(TenantConnection::new(
            self.identity.clone(),
            db,
            self.blobs.clone(),
            guard,
        ))
    }

    pub(super) async fn open(&self) -> Result<DatabaseConnection, DbErr> {
        Database::connect(self.options.clone()).await
    }

    /// Identity this handle belongs to.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Tenant directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the tenant's SQLite file.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.root.join(DATABASE_FILE)
    }

    /// The tenant's blob store.
    #[must_use]
    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }
}

impl std::fmt::Debug for TenantHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantHandle")
            .field("identity", &self.identity)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

fn connect_options(path: &Path, settings: &ConnectionSettings) -> ConnectOptions {
    let mut options = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
    options
        .max_connections(1)
        .min_connections(1)
        .connect_timeout(settings.connect_timeout)
        .sqlx_logging(settings.sqlx_logging);
    options
}

async fn initialize(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute_unprepared("PRAGMA journal_mode=WAL").await?;
    Migrator::up(db, None).await?;
    ensure_root(db).await
}
