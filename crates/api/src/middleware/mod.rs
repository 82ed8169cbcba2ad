//! HTTP middleware.

pub mod tenant;

pub use tenant::{TenantScope, resolve_identity, tenant_scope};
