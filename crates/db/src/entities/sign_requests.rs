//! `SeaORM` Entity for sign_requests table.
//!
//! Signers and output files are stored as JSON text.

use boxmock_core::sign::{SignFile, Signer};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "sign_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub status: String,
    pub parent_folder_id: Option<String>,
    pub redirect_url: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub signers_json: String,
    #[sea_orm(column_type = "Text")]
    pub files_json: String,
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Decoded signers; malformed JSON reads as no signers.
    #[must_use]
    pub fn signers(&self) -> Vec<Signer> {
        serde_json::from_str(&self.signers_json).unwrap_or_default()
    }

    /// Decoded output files; malformed JSON reads as no files.
    #[must_use]
    pub fn files(&self) -> Vec<SignFile> {
        serde_json::from_str(&self.files_json).unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
