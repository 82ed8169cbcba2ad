//! Sign request repository.

use boxmock_core::sign::{self, DEFAULT_SIGN_STATUS, SignerInput, SourceFileInput};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryOrder, Set,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::sign_requests;

/// Input for creating a sign request.
#[derive(Debug, Clone, Default)]
pub struct CreateSignRequestInput {
    /// Signers to invite.
    pub signers: Vec<SignerInput>,
    /// Documents to sign.
    pub source_files: Vec<SourceFileInput>,
    /// Folder receiving the signed documents.
    pub parent_folder_id: Option<String>,
    /// Where signers land after signing.
    pub redirect_url: Option<String>,
}

/// Sign request repository.
#[derive(Debug, Clone)]
pub struct SignRequestRepository {
    db: DatabaseConnection,
}

impl SignRequestRepository {
    /// Creates a new sign request repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a sign request by ID.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<sign_requests::Model>, DbErr> {
        sign_requests::Entity::find_by_id(id).one(&self.db).await
    }

    /// Creates a sign request with generated signer links and output files.
    pub async fn create(
        &self,
        input: CreateSignRequestInput,
    ) -> Result<sign_requests::Model, DbErr> {
        let id = Uuid::new_v4().to_string();
        let signers = sign::build_signers(&id, &input.signers);
        let files = sign::build_output_files(&input.source_files);

        let signers_json =
            serde_json::to_string(&signers).map_err(|e| DbErr::Custom(e.to_string()))?;
        let files_json =
            serde_json::to_string(&files).map_err(|e| DbErr::Custom(e.to_string()))?;

        let model = sign_requests::ActiveModel {
            id: Set(id),
            status: Set(DEFAULT_SIGN_STATUS.to_string()),
            parent_folder_id: Set(input.parent_folder_id),
            redirect_url: Set(input.redirect_url),
            signers_json: Set(signers_json),
            files_json: Set(files_json),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(&self.db)
        .await?;

        info!(
            sign_request_id = %model.id,
            signers = signers.len(),
            files = files.len(),
            "Sign request created"
        );
        Ok(model)
    }

    /// All sign requests, oldest first.
    pub async fn list(&self) -> Result<Vec<sign_requests::Model>, DbErr> {
        sign_requests::Entity::find()
            .order_by_asc(sign_requests::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Number of sign requests in the tenant.
    pub async fn count(&self) -> Result<u64, DbErr> {
        sign_requests::Entity::find().count(&self.db).await
    }
}
