//! User routes.

use axum::{
    Json, Router,
    extract::{Path, Query},
    http::StatusCode,
    routing::get,
};
use boxmock_db::entities::users;
use boxmock_db::repositories::CreateUserInput;
use serde::{Deserialize, Serialize};

use super::{Collection, timestamp};
use crate::{AppState, error::ApiError, error::ApiResult, middleware::TenantScope};

/// Name given to users created without one.
const DEFAULT_USER_NAME: &str = "Unnamed User";

/// Creates the user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(get_current_user))
        .route("/users", get(list_users).post(create_user))
        .route("/users/{user_id}", get(get_user).delete(delete_user))
}

/// User as returned to callers.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// Always `"user"`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// User ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Login.
    pub login: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// App user without a login of its own.
    pub is_platform_access_only: bool,
    /// Job title.
    pub job_title: Option<String>,
    /// Creation time (RFC 3339).
    pub created_at: String,
}

impl From<users::Model> for UserResponse {
    fn from(user: users::Model) -> Self {
        Self {
            kind: "user",
            created_at: timestamp(&user.created_at),
            id: user.id,
            name: user.name,
            login: user.login,
            email: user.email,
            is_platform_access_only: user.is_platform_access_only,
            job_title: user.job_title,
        }
    }
}

/// Query parameters for listing users.
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    /// Substring matched against name, email and login.
    pub filter_term: Option<String>,
}

/// Request body for creating a user.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Display name.
    pub name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Login.
    pub login: Option<String>,
    /// App user without a login of its own.
    #[serde(default)]
    pub is_platform_access_only: bool,
    /// Job title.
    pub job_title: Option<String>,
}

/// GET `/users/me`
///
/// The tenant's first user; a service user is created if there is none.
async fn get_current_user(tenant: TenantScope) -> ApiResult<Json<UserResponse>> {
    let user = tenant.users().me().await?;
    Ok(Json(user.into()))
}

/// GET `/users`
async fn list_users(
    tenant: TenantScope,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<Collection<UserResponse>>> {
    let users = tenant.users().list(query.filter_term.as_deref()).await?;
    let entries: Vec<UserResponse> = users.into_iter().map(Into::into).collect();
    Ok(Json(entries.into()))
}

/// POST `/users`
async fn create_user(
    tenant: TenantScope,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let user = tenant
        .users()
        .create(CreateUserInput {
            name: payload
                .name
                .unwrap_or_else(|| DEFAULT_USER_NAME.to_string()),
            email: payload.email,
            login: payload.login,
            is_platform_access_only: payload.is_platform_access_only,
            job_title: payload.job_title,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET `/users/{user_id}`
async fn get_user(
    tenant: TenantScope,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    tenant
        .users()
        .find_by_id(&user_id)
        .await?
        .map(|user| Json(user.into()))
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// DELETE `/users/{user_id}`
async fn delete_user(tenant: TenantScope, Path(user_id): Path<String>) -> ApiResult<StatusCode> {
    if tenant.users().delete(&user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("User not found"))
    }
}
