//! Tenant storage layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Per-tenant schema migrations
//! - Repository abstractions for data access
//! - The tenant registry, handles and request-scoped connections

pub mod entities;
pub mod migration;
pub mod repositories;
pub mod tenant;

pub use repositories::{FileRepository, FolderRepository, SignRequestRepository, UserRepository};
pub use tenant::{
    ConnectionSettings, ResetSummary, TenantConnection, TenantError, TenantHandle, TenantRegistry,
};
