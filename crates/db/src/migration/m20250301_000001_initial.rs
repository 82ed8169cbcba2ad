//! Initial tenant schema: folders, files, users and sign requests.
//!
//! Statements are idempotent so that a tenant whose first initialization was
//! interrupted can be initialized again from scratch.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(SCHEMA_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

/// Creates every tenant table that does not exist yet.
pub const SCHEMA_SQL: &str = r"
-- Folder tree; the root is the only row without a parent
CREATE TABLE IF NOT EXISTS folders (
    id TEXT PRIMARY KEY NOT NULL,
    parent_id TEXT REFERENCES folders(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL,
    CONSTRAINT chk_root_has_no_parent CHECK ((id = '0') = (parent_id IS NULL))
);

CREATE INDEX IF NOT EXISTS idx_folders_parent ON folders(parent_id);

-- File metadata; content is the blob named after id
CREATE TABLE IF NOT EXISTS files (
    id TEXT PRIMARY KEY NOT NULL,
    folder_id TEXT NOT NULL REFERENCES folders(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    version INTEGER NOT NULL DEFAULT 1 CHECK (version >= 1),
    size INTEGER NOT NULL DEFAULT 0 CHECK (size >= 0),
    created_at TEXT NOT NULL
);

-- Listing a folder and the preflight name check
CREATE INDEX IF NOT EXISTS idx_files_folder_name ON files(folder_id, name);

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    email TEXT,
    login TEXT,
    is_platform_access_only BOOLEAN NOT NULL DEFAULT 0,
    job_title TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sign_requests (
    id TEXT PRIMARY KEY NOT NULL,
    status TEXT NOT NULL DEFAULT 'created',
    parent_folder_id TEXT,
    redirect_url TEXT,
    signers_json TEXT NOT NULL DEFAULT '[]',
    files_json TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL
);
";

/// Drops every tenant table, children first.
pub const DROP_SQL: &str = r"
DROP TABLE IF EXISTS files;
DROP TABLE IF EXISTS sign_requests;
DROP TABLE IF EXISTS users;
DROP TABLE IF EXISTS folders;
";
