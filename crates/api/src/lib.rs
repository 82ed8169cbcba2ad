//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - Provider-compatible REST routes under `/2.0`
//! - The per-request tenant scope middleware
//! - Admin routes for health, reset and browsing
//! - Error responses in the provider's shape

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit};
use boxmock_db::TenantRegistry;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Largest accepted request body, uploads included.
pub const MAX_BODY_BYTES: usize = 256 * 1024 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Tenant handles, created on first access per identity.
    pub registry: Arc<TenantRegistry>,
}

impl AppState {
    /// Creates state around a tenant registry.
    #[must_use]
    pub fn new(registry: TenantRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::admin_routes())
        .nest("/2.0", routes::api_routes_with_state(state.clone()))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
