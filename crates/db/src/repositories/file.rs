//! File repository.
//!
//! Every file record is paired with a blob under the same id. Operations that
//! write both touch the record first, write the blob, and only then commit, so
//! a failed blob write leaves no record behind.

use boxmock_core::storage::{BlobStore, StorageError};
use bytes::Bytes;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::entities::{files, folders};
use crate::repositories::folder::lock_folder;

/// Name given to uploads that arrive without one.
pub const DEFAULT_FILE_NAME: &str = "unnamed_file";

/// Error types for file operations.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    /// File record not found.
    #[error("File not found: {0}")]
    NotFound(String),

    /// Target folder not found.
    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    /// Upload carried no content.
    #[error("No file content provided")]
    EmptyContent,

    /// Record exists but its blob does not.
    #[error("File content not found: {0}")]
    ContentNotFound(String),

    /// A file with this name already exists in the folder.
    #[error("Item with the same name already exists")]
    NameInUse {
        /// Conflicting file ID.
        id: String,
        /// Conflicting file name.
        name: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Blob storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Input for uploading a new file.
#[derive(Debug, Clone)]
pub struct UploadFileInput {
    /// File name.
    pub name: String,
    /// Folder to place the file in.
    pub folder_id: String,
    /// Full content.
    pub content: Bytes,
}

/// Input for copying a file. `None` fields default to the source's values.
#[derive(Debug, Clone, Default)]
pub struct CopyFileInput {
    /// Destination folder.
    pub folder_id: Option<String>,
    /// Name of the copy.
    pub name: Option<String>,
}

/// File repository for record and content operations.
#[derive(Debug, Clone)]
pub struct FileRepository {
    db: DatabaseConnection,
    blobs: BlobStore,
}

impl FileRepository {
    /// Creates a new file repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, blobs: BlobStore) -> Self {
        Self { db, blobs }
    }

    /// Finds a file by ID.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<files::Model>, DbErr> {
        files::Entity::find_by_id(id).one(&self.db).await
    }

    /// Gets a file by ID, failing if absent.
    pub async fn get(&self, id: &str) -> Result<files::Model, FileError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| FileError::NotFound(id.to_string()))
    }

    /// Stores a new file at version 1.
    pub async fn upload(&self, input: UploadFileInput) -> Result<files::Model, FileError> {
        let txn = self.db.begin().await?;
        if !lock_folder(&txn, &input.folder_id).await? {
            return Err(FileError::FolderNotFound(input.folder_id));
        }
        if input.content.is_empty() {
            return Err(FileError::EmptyContent);
        }

        let id = Uuid::new_v4().to_string();
        let size = byte_len(&input.content);
        let file = files::ActiveModel {
            id: Set(id.clone()),
            folder_id: Set(input.folder_id),
            name: Set(input.name),
            version: Set(1),
            size: Set(size),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(&txn)
        .await?;

        write_blob(&self.blobs, txn, &id, input.content).await?;

        info!(file_id = %id, size, "File uploaded");
        Ok(file)
    }

    /// Replaces a file's content, bumping its version.
    ///
    /// The version and size change in one statement; concurrent uploads to the
    /// same file are last writer wins.
    pub async fn upload_version(&self, id: &str, content: Bytes) -> Result<files::Model, FileError> {
        if content.is_empty() {
            return Err(FileError::EmptyContent);
        }
        let size = byte_len(&content);

        let txn = self.db.begin().await?;
        let result = files::Entity::update_many()
            .col_expr(
                files::Column::Version,
                Expr::col(files::Column::Version).add(1),
            )
            .col_expr(files::Column::Size, Expr::value(size))
            .filter(files::Column::Id.eq(id))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(FileError::NotFound(id.to_string()));
        }
        let Some(file) = files::Entity::find_by_id(id).one(&txn).await? else {
            return Err(FileError::NotFound(id.to_string()));
        };

        write_blob(&self.blobs, txn, id, content).await?;

        info!(file_id = id, version = file.version, size, "File version uploaded");
        Ok(file)
    }

    /// Renames a file.
    pub async fn rename(&self, id: &str, name: String) -> Result<files::Model, FileError> {
        let file = self.get(id).await?;
        let mut active: files::ActiveModel = file.into();
        active.name = Set(name);
        Ok(active.update(&self.db).await?)
    }

    /// Deletes a file record and its blob.
    pub async fn delete(&self, id: &str) -> Result<(), FileError> {
        let txn = self.db.begin().await?;
        let result = files::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(FileError::NotFound(id.to_string()));
        }
        txn.commit().await?;

        self.blobs.delete(id).await?;
        info!(file_id = id, "File deleted");
        Ok(())
    }

    /// Returns a file's record together with its current content.
    pub async fn content(&self, id: &str) -> Result<(files::Model, Bytes), FileError> {
        let file = self.get(id).await?;
        match self.blobs.read(id).await {
            Ok(bytes) => Ok((file, bytes)),
            Err(StorageError::NotFound { .. }) => Err(FileError::ContentNotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Copies a file into a folder of the same tenant under a new ID.
    pub async fn copy(&self, id: &str, input: CopyFileInput) -> Result<files::Model, FileError> {
        let source = self.get(id).await?;
        let folder_id = input.folder_id.unwrap_or_else(|| source.folder_id.clone());

        let new_id = Uuid::new_v4().to_string();
        let txn = self.db.begin().await?;
        if !lock_folder(&txn, &folder_id).await? {
            return Err(FileError::FolderNotFound(folder_id));
        }
        let mut copy = files::ActiveModel {
            id: Set(new_id.clone()),
            folder_id: Set(folder_id),
            name: Set(input.name.unwrap_or_else(|| source.name.clone())),
            version: Set(1),
            size: Set(source.size),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(&txn)
        .await?;

        // Re-read under the write lock: a version may have landed since.
        let Some(current) = files::Entity::find_by_id(id).one(&txn).await? else {
            return Err(FileError::NotFound(id.to_string()));
        };
        if current.size != copy.size {
            let mut active: files::ActiveModel = copy.into();
            active.size = Set(current.size);
            copy = active.update(&txn).await?;
        }

        match self.blobs.copy(id, &new_id).await {
            Ok(()) => {}
            Err(StorageError::NotFound { .. }) => {
                txn.rollback().await?;
                return Err(FileError::ContentNotFound(id.to_string()));
            }
            Err(e) => {
                txn.rollback().await?;
                return Err(e.into());
            }
        }
        txn.commit().await?;

        info!(source_id = id, file_id = %new_id, "File copied");
        Ok(copy)
    }

    /// Checks that `name` is free in `folder_id` before an upload.
    pub async fn preflight(&self, name: &str, folder_id: &str) -> Result<(), FileError> {
        self.require_folder(folder_id).await?;
        let existing = files::Entity::find()
            .filter(files::Column::FolderId.eq(folder_id))
            .filter(files::Column::Name.eq(name))
            .one(&self.db)
            .await?;

        match existing {
            Some(file) => Err(FileError::NameInUse {
                id: file.id,
                name: file.name,
            }),
            None => Ok(()),
        }
    }

    /// Number of file records in the tenant.
    pub async fn count(&self) -> Result<u64, DbErr> {
        files::Entity::find().count(&self.db).await
    }

    async fn require_folder(&self, folder_id: &str) -> Result<(), FileError> {
        if folders::Entity::find_by_id(folder_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(FileError::FolderNotFound(folder_id.to_string()));
        }
        Ok(())
    }
}

/// Writes the blob and commits `txn`, rolling back if the write fails.
async fn write_blob(
    blobs: &BlobStore,
    txn: DatabaseTransaction,
    id: &str,
    content: Bytes,
) -> Result<(), FileError> {
    if let Err(e) = blobs.write(id, content).await {
        debug!(file_id = id, error = %e, "Blob write failed, rolling back");
        txn.rollback().await?;
        return Err(e.into());
    }
    txn.commit().await?;
    Ok(())
}

fn byte_len(content: &Bytes) -> i64 {
    i64::try_from(content.len()).unwrap_or(i64::MAX)
}
