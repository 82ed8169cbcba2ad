//! Blob store implementation using Apache OpenDAL.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};
use tracing::debug;

use super::error::StorageError;

/// Directory under the tenant root holding one blob per file id.
pub const FILES_DIR: &str = "files";

/// Directory under the tenant root where writes are staged before rename.
pub const STAGING_DIR: &str = ".staging";

/// Filesystem-backed content store for a single tenant.
///
/// Blob names equal the owning file's identifier, with no extension.
#[derive(Clone)]
pub struct BlobStore {
    operator: Operator,
    files_dir: PathBuf,
}

impl BlobStore {
    /// Open (creating if needed) the blob store under a tenant directory.
    pub async fn open(tenant_dir: &Path) -> Result<Self, StorageError> {
        let files_dir = tenant_dir.join(FILES_DIR);
        let staging_dir = tenant_dir.join(STAGING_DIR);

        for dir in [&files_dir, &staging_dir] {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                StorageError::configuration(format!("cannot create {}: {e}", dir.display()))
            })?;
        }

        let builder = services::Fs::default()
            .root(path_str(&files_dir)?)
            .atomic_write_dir(path_str(&staging_dir)?);

        let operator = Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish();

        Ok(Self {
            operator,
            files_dir,
        })
    }

    /// Directory holding this tenant's blobs.
    #[must_use]
    pub fn files_dir(&self) -> &Path {
        &self.files_dir
    }

    /// Write a blob, fully replacing any previous content under the same key.
    pub async fn write(&self, key: &str, content: Bytes) -> Result<(), StorageError> {
        validate_key(key)?;
        let len = content.len();
        self.operator.write(key, content).await?;
        debug!(key, bytes = len, "Blob written");
        Ok(())
    }

    /// Read a blob's full content.
    pub async fn read(&self, key: &str) -> Result<Bytes, StorageError> {
        validate_key(key)?;
        match self.operator.read(key).await {
            Ok(buffer) => Ok(buffer.to_bytes()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::not_found(key)),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a blob. Deleting a missing blob succeeds.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.operator.delete(key).await?;
        debug!(key, "Blob deleted");
        Ok(())
    }

    /// Duplicate a blob under a new key within this tenant.
    pub async fn copy(&self, from: &str, to: &str) -> Result<(), StorageError> {
        validate_key(from)?;
        validate_key(to)?;
        match self.operator.copy(from, to).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::not_found(from)),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a blob exists.
    pub async fn exists(&self, key: &str) -> bool {
        if validate_key(key).is_err() {
            return false;
        }
        match self.operator.stat(key).await {
            Ok(meta) => meta.is_file(),
            Err(_) => false,
        }
    }

    /// Keys of every blob currently stored.
    pub async fn list(&self) -> Result<Vec<String>, StorageError> {
        let entries = self.operator.list("/").await?;
        Ok(entries
            .into_iter()
            .filter(|entry| entry.metadata().is_file())
            .map(|entry| entry.name().to_string())
            .collect())
    }

    /// Number of blobs currently stored.
    pub async fn count(&self) -> Result<usize, StorageError> {
        Ok(self.list().await?.len())
    }

    /// Delete every blob, returning how many were removed.
    pub async fn clear(&self) -> Result<usize, StorageError> {
        let keys = self.list().await?;
        for key in &keys {
            self.operator.delete(key).await?;
        }
        debug!(removed = keys.len(), dir = %self.files_dir.display(), "Blob store cleared");
        Ok(keys.len())
    }
}

impl std::fmt::Debug for BlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobStore")
            .field("files_dir", &self.files_dir)
            .finish_non_exhaustive()
    }
}

fn path_str(path: &Path) -> Result<&str, StorageError> {
    path.to_str()
        .ok_or_else(|| StorageError::configuration(format!("non UTF-8 path: {}", path.display())))
}

/// A key names exactly one file directly inside the blob directory.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let invalid = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains(['/', '\\', '\0']);
    if invalid {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    async fn store() -> (tempfile::TempDir, BlobStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::open(dir.path()).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_open_creates_layout() {
        let (dir, store) = store().await;
        assert!(dir.path().join(FILES_DIR).is_dir());
        assert!(dir.path().join(STAGING_DIR).is_dir());
        assert_eq!(store.files_dir(), dir.path().join(FILES_DIR));
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let (dir, store) = store().await;
        store.write("f1", Bytes::from_static(b"hello")).await.unwrap();

        assert_eq!(store.read("f1").await.unwrap(), Bytes::from_static(b"hello"));
        // Blob file name equals the key, no extension.
        assert!(dir.path().join(FILES_DIR).join("f1").is_file());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_content() {
        let (_dir, store) = store().await;
        store.write("f1", Bytes::from_static(b"a much longer first version")).await.unwrap();
        store.write("f1", Bytes::from_static(b"v2")).await.unwrap();

        assert_eq!(store.read("f1").await.unwrap(), Bytes::from_static(b"v2"));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let (_dir, store) = store().await;
        let err = store.read("missing").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
        assert!(!store.exists("missing").await);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_dir, store) = store().await;
        store.write("f1", Bytes::from_static(b"x")).await.unwrap();
        store.delete("f1").await.unwrap();
        store.delete("f1").await.unwrap();
        assert!(!store.exists("f1").await);
    }

    #[tokio::test]
    async fn test_copy_duplicates_bytes() {
        let (_dir, store) = store().await;
        store.write("src", Bytes::from_static(b"payload")).await.unwrap();
        store.copy("src", "dst").await.unwrap();

        assert_eq!(store.read("dst").await.unwrap(), Bytes::from_static(b"payload"));
        assert_eq!(store.read("src").await.unwrap(), Bytes::from_static(b"payload"));
    }

    #[tokio::test]
    async fn test_clear_removes_all_blobs() {
        let (_dir, store) = store().await;
        for key in ["a", "b", "c"] {
            store.write(key, Bytes::from_static(b"x")).await.unwrap();
        }

        assert_eq!(store.clear().await.unwrap(), 3);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case("..")]
    #[case("../escape")]
    #[case("nested/key")]
    #[case("back\\slash")]
    #[tokio::test]
    async fn test_invalid_keys_rejected(#[case] key: &str) {
        let (_dir, store) = store().await;
        let err = store.write(key, Bytes::from_static(b"x")).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }
}
