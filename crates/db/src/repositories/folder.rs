//! Folder repository for database operations.

use std::collections::HashSet;

use boxmock_core::folder::{
    self as tree, FileLeaf, FolderNode, FolderTree, ROOT_FOLDER_ID, ROOT_FOLDER_NAME,
};
use boxmock_core::storage::{BlobStore, StorageError};
use sea_orm::sea_query::{Expr, OnConflict, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::{files, folders};

/// Error types for folder operations.
#[derive(Debug, thiserror::Error)]
pub enum FolderError {
    /// Folder not found.
    #[error("Folder not found: {0}")]
    NotFound(String),

    /// Parent folder not found.
    #[error("Parent folder not found: {0}")]
    ParentNotFound(String),

    /// The root folder cannot be deleted.
    #[error("Cannot delete root folder")]
    DeleteRoot,

    /// The root folder cannot be renamed or moved.
    #[error("Cannot modify root folder")]
    ModifyRoot,

    /// Moving a folder under itself or one of its descendants.
    #[error("Cannot move folder '{folder_id}' into its own subtree '{parent_id}'")]
    MoveIntoSubtree {
        /// Folder being moved.
        folder_id: String,
        /// Requested parent.
        parent_id: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Blob storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Input for creating a folder.
#[derive(Debug, Clone)]
pub struct CreateFolderInput {
    /// Folder name.
    pub name: String,
    /// Parent folder ID.
    pub parent_id: String,
}

/// Input for updating a folder. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateFolderInput {
    /// New name.
    pub name: Option<String>,
    /// New parent folder ID.
    pub parent_id: Option<String>,
}

/// Direct contents of a folder.
#[derive(Debug, Clone)]
pub struct FolderItems {
    /// Subfolders, one level deep.
    pub folders: Vec<folders::Model>,
    /// Files directly inside the folder.
    pub files: Vec<files::Model>,
}

impl FolderItems {
    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.folders.len() + self.files.len()
    }

    /// Whether the folder is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What a cascading delete removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletedSubtree {
    /// Folders removed, including the target.
    pub folders: usize,
    /// Files removed (records and blobs).
    pub files: usize,
}

/// Folder repository for CRUD and tree operations.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    db: DatabaseConnection,
    blobs: BlobStore,
}

impl FolderRepository {
    /// Creates a new folder repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, blobs: BlobStore) -> Self {
        Self { db, blobs }
    }

    /// Finds a folder by ID.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<folders::Model>, DbErr> {
        folders::Entity::find_by_id(id).one(&self.db).await
    }

    /// Gets a folder by ID, failing if absent.
    pub async fn get(&self, id: &str) -> Result<folders::Model, FolderError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| FolderError::NotFound(id.to_string()))
    }

    /// Creates a folder under an existing parent.
    pub async fn create(&self, input: CreateFolderInput) -> Result<folders::Model, FolderError> {
        let txn = self.db.begin().await?;
        if !lock_folder(&txn, &input.parent_id).await? {
            return Err(FolderError::ParentNotFound(input.parent_id));
        }

        let folder = folders::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            parent_id: Set(Some(input.parent_id)),
            name: Set(input.name),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;
        Ok(folder)
    }

    /// Renames and/or moves a folder.
    ///
    /// A folder can never become its own ancestor, so the parent chain of
    /// every folder keeps ending at the root.
    pub async fn update(
        &self,
        id: &str,
        input: UpdateFolderInput,
    ) -> Result<folders::Model, FolderError> {
        let folder = self.get(id).await?;
        if input.name.is_none() && input.parent_id.is_none() {
            return Ok(folder);
        }
        if tree::is_root(id) {
            return Err(FolderError::ModifyRoot);
        }

        let txn = self.db.begin().await?;
        if !lock_folder(&txn, id).await? {
            return Err(FolderError::NotFound(id.to_string()));
        }
        let mut active: folders::ActiveModel = folder.into();

        if let Some(parent_id) = input.parent_id {
            if folders::Entity::find_by_id(&parent_id).one(&txn).await?.is_none() {
                return Err(FolderError::ParentNotFound(parent_id));
            }
            if subtree_ids(&txn, id).await?.contains(&parent_id) {
                return Err(FolderError::MoveIntoSubtree {
                    folder_id: id.to_string(),
                    parent_id,
                });
            }
            active.parent_id = Set(Some(parent_id));
        }
        if let Some(name) = input.name {
            active.name = Set(name);
        }

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Deletes a folder with every descendant folder and file.
    ///
    /// Records are removed in one transaction; blobs of the removed files are
    /// deleted once it has committed. Every blob is attempted, and the first
    /// blob failure is returned after the rest have been tried.
    pub async fn delete(&self, id: &str) -> Result<DeletedSubtree, FolderError> {
        if tree::is_root(id) {
            return Err(FolderError::DeleteRoot);
        }

        let txn = self.db.begin().await?;
        if !lock_folder(&txn, id).await? {
            return Err(FolderError::NotFound(id.to_string()));
        }

        let folder_ids = subtree_ids(&txn, id).await?;
        let file_ids: Vec<String> = files::Entity::find()
            .select_only()
            .column(files::Column::Id)
            .filter(files::Column::FolderId.is_in(folder_ids.clone()))
            .into_tuple()
            .all(&txn)
            .await?;

        files::Entity::delete_many()
            .filter(files::Column::FolderId.is_in(folder_ids.clone()))
            .exec(&txn)
            .await?;
        folders::Entity::delete_many()
            .filter(folders::Column::Id.is_in(folder_ids.clone()))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        let mut first_failure = None;
        for file_id in &file_ids {
            if let Err(e) = self.blobs.delete(file_id).await {
                warn!(file_id, error = %e, "Failed to delete blob of removed file");
                first_failure.get_or_insert(e);
            }
        }
        if let Some(e) = first_failure {
            warn!(
                folder_id = id,
                folders = folder_ids.len(),
                files = file_ids.len(),
                "Folder subtree deleted with leftover blobs"
            );
            return Err(e.into());
        }

        info!(
            folder_id = id,
            folders = folder_ids.len(),
            files = file_ids.len(),
            "Folder subtree deleted"
        );
        Ok(DeletedSubtree {
            folders: folder_ids.len(),
            files: file_ids.len(),
        })
    }

    /// Lists subfolders and files directly inside a folder.
    pub async fn items(&self, id: &str) -> Result<FolderItems, FolderError> {
        self.get(id).await?;

        let folders = folders::Entity::find()
            .filter(folders::Column::ParentId.eq(id))
            .order_by_asc(folders::Column::CreatedAt)
            .order_by_asc(folders::Column::Id)
            .all(&self.db)
            .await?;
        let files = files::Entity::find()
            .filter(files::Column::FolderId.eq(id))
            .order_by_asc(files::Column::CreatedAt)
            .order_by_asc(files::Column::Id)
            .all(&self.db)
            .await?;

        Ok(FolderItems { folders, files })
    }

    /// Nested view of the whole tenant tree, starting at the root.
    pub async fn tree(&self) -> Result<FolderTree, DbErr> {
        let folders: Vec<FolderNode> = folders::Entity::find()
            .order_by_asc(folders::Column::CreatedAt)
            .order_by_asc(folders::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|f| FolderNode {
                id: f.id,
                name: f.name,
                parent_id: f.parent_id,
            })
            .collect();
        let files: Vec<FileLeaf> = files::Entity::find()
            .order_by_asc(files::Column::CreatedAt)
            .order_by_asc(files::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|f| FileLeaf {
                id: f.id,
                name: f.name,
                size: f.size,
                folder_id: f.folder_id,
            })
            .collect();

        Ok(tree::build_tree(ROOT_FOLDER_ID, &folders, &files).unwrap_or_else(FolderTree::empty))
    }

    /// Number of folders in the tenant, root included.
    pub async fn count(&self) -> Result<u64, DbErr> {
        folders::Entity::find().count(&self.db).await
    }
}

/// Inserts the root folder unless it already exists.
pub async fn ensure_root<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    let root = folders::ActiveModel {
        id: Set(ROOT_FOLDER_ID.to_string()),
        parent_id: Set(None),
        name: Set(ROOT_FOLDER_NAME.to_string()),
        created_at: Set(chrono::Utc::now()),
    };

    folders::Entity::insert(root)
        .on_conflict(
            OnConflict::column(folders::Column::Id)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// No-op write on a folder row, so the transaction holds the write lock
/// before it reads. Returns whether the folder exists.
pub(crate) async fn lock_folder<C: ConnectionTrait>(db: &C, id: &str) -> Result<bool, DbErr> {
    let result = folders::Entity::update_many()
        .col_expr(folders::Column::Name, SimpleExpr::from(Expr::col(folders::Column::Name)))
        .filter(folders::Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// IDs of a folder and all of its descendants, found level by level.
pub async fn subtree_ids<C: ConnectionTrait>(db: &C, id: &str) -> Result<Vec<String>, DbErr> {
    let mut seen: HashSet<String> = HashSet::from([id.to_string()]);
    let mut all = vec![id.to_string()];
    let mut frontier = vec![id.to_string()];

    while !frontier.is_empty() {
        let children: Vec<String> = folders::Entity::find()
            .select_only()
            .column(folders::Column::Id)
            .filter(folders::Column::ParentId.is_in(frontier))
            .into_tuple()
            .all(db)
            .await?;

        frontier = children
            .into_iter()
            .filter(|child| seen.insert(child.clone()))
            .collect();
        all.extend(frontier.iter().cloned());
    }

    Ok(all)
}
