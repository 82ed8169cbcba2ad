//! Identity to tenant handle registry.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use boxmock_shared::{AppConfig, Identity};
use dashmap::DashMap;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::error::TenantError;
use super::handle::{ConnectionSettings, DATABASE_FILE, TenantHandle};
use super::reset::ResetSummary;

type TenantSlot = Arc<OnceCell<Arc<TenantHandle>>>;

/// Lazily created tenant handles, one per identity.
///
/// The first access for an identity inserts an empty slot atomically and
/// initializes it; racing callers wait on the same slot, so each identity's
/// storage is created once per process. A failed initialization leaves the
/// slot empty and the next access tries again.
#[derive(Debug)]
pub struct TenantRegistry {
    data_dir: PathBuf,
    settings: ConnectionSettings,
    tenants: DashMap<Identity, TenantSlot>,
    initializations: AtomicUsize,
}

impl TenantRegistry {
    /// Creates an empty registry storing tenants under `data_dir`.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>, settings: ConnectionSettings) -> Self {
        Self {
            data_dir: data_dir.into(),
            settings,
            tenants: DashMap::new(),
            initializations: AtomicUsize::new(0),
        }
    }

    /// Creates a registry from application configuration.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.storage.data_dir.clone(),
            ConnectionSettings::from(&config.database),
        )
    }

    /// Root directory holding every tenant.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the identity's handle, creating its storage on first access.
    ///
    /// # Errors
    ///
    /// Returns [`TenantError::StorageInit`] if the storage cannot be created.
    pub async fn get_or_create(&self, identity: &Identity) -> Result<Arc<TenantHandle>, TenantError> {
        let slot = Arc::clone(self.tenants.entry(identity.clone()).or_default().value());

        let handle = slot
            .get_or_try_init(|| async {
                self.initializations.fetch_add(1, Ordering::SeqCst);
                debug!(identity = %identity, "Initializing tenant storage");
                TenantHandle::create(identity.clone(), &self.data_dir, &self.settings)
                    .await
                    .map(Arc::new)
            })
            .await?;

        Ok(Arc::clone(handle))
    }

    /// Returns the identity's handle if this process already created it.
    #[must_use]
    pub fn get(&self, identity: &Identity) -> Option<Arc<TenantHandle>> {
        self.tenants
            .get(identity)
            .and_then(|slot| slot.get().cloned())
    }

    /// Number of storage initializations started so far.
    #[must_use]
    pub fn initializations(&self) -> usize {
        self.initializations.load(Ordering::SeqCst)
    }

    /// Whether the identity has a database on disk.
    ///
    /// # Errors
    ///
    /// Returns [`TenantError::StorageInit`] if the tenant directory cannot be
    /// inspected.
    pub async fn has_storage(&self, identity: &Identity) -> Result<bool, TenantError> {
        let path = self
            .data_dir
            .join(identity.dir_name())
            .join(DATABASE_FILE);
        tokio::fs::try_exists(path)
            .await
            .map_err(|e| TenantError::storage_init(identity, e))
    }

    /// Identities with storage under the data directory, including ones
    /// created by earlier runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be read.
    pub async fn known_identities(&self) -> std::io::Result<Vec<Identity>> {
        let mut entries = match tokio::fs::read_dir(&self.data_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut identities = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            if !tokio::fs::try_exists(entry.path().join(DATABASE_FILE)).await? {
                continue;
            }
            if let Some(identity) = entry.file_name().to_str().and_then(Identity::from_dir_name) {
                identities.push(identity);
            }
        }

        identities.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(identities)
    }

    /// Resets the identity's tenant.
    ///
    /// An identity with no storage is left alone and `None` is returned.
    /// One with storage from an earlier run is loaded first.
    ///
    /// # Errors
    ///
    /// Returns an error if loading or resetting the tenant fails.
    pub async fn reset(&self, identity: &Identity) -> Result<Option<ResetSummary>, TenantError> {
        let handle = match self.get(identity) {
            Some(handle) => handle,
            None if self.has_storage(identity).await? => self.get_or_create(identity).await?,
            None => {
                info!(identity = %identity, "Reset skipped, identity has no storage");
                return Ok(None);
            }
        };

        handle.reset().await.map(Some)
    }
}
