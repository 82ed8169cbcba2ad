//! `SeaORM` entity definitions for the per-tenant schema.

pub mod prelude;

pub mod files;
pub mod folders;
pub mod sign_requests;
pub mod users;
