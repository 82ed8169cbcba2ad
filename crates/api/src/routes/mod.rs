//! API route definitions.

use axum::{Router, middleware};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AppState, middleware::tenant_scope};

pub mod admin;
pub mod collaborations;
pub mod files;
pub mod folders;
pub mod health;
pub mod sign_requests;
pub mod users;

/// Creates the admin router, served outside any tenant scope.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(admin::routes())
}

/// Creates the provider API router with every route inside the tenant scope.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(folders::routes())
        .merge(files::routes())
        .merge(users::routes())
        .merge(sign_requests::routes())
        .merge(collaborations::routes())
        .layer(middleware::from_fn_with_state(state.clone(), tenant_scope))
}

// ============================================================================
// Shared Request/Response Types
// ============================================================================

/// Reference to another item, as in `{"type": "folder", "id": "0"}`.
#[derive(Debug, Clone, Serialize)]
pub struct ItemRef {
    /// Item type.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Item ID.
    pub id: String,
}

impl ItemRef {
    /// Reference to a folder.
    #[must_use]
    pub fn folder(id: impl Into<String>) -> Self {
        Self {
            kind: "folder",
            id: id.into(),
        }
    }
}

/// Parent reference as sent by callers; only the ID is read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParentRef {
    /// Parent ID.
    #[serde(default)]
    pub id: Option<String>,
}

/// Paged-style collection body.
#[derive(Debug, Serialize)]
pub struct Collection<T> {
    /// Items.
    pub entries: Vec<T>,
    /// Number of items.
    pub total_count: usize,
}

impl<T> From<Vec<T>> for Collection<T> {
    fn from(entries: Vec<T>) -> Self {
        Self {
            total_count: entries.len(),
            entries,
        }
    }
}

/// Upload result body: `{"entries": [file]}`.
#[derive(Debug, Serialize)]
pub struct Entries<T> {
    /// Items.
    pub entries: Vec<T>,
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339()
}
