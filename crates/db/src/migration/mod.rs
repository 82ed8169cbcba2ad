//! Per-tenant schema migrations.
//!
//! Migrations are managed using sea-orm-migration and run against every
//! tenant database when it is first opened.

pub use sea_orm_migration::prelude::*;

mod m20250301_000001_initial;

pub use m20250301_000001_initial::{DROP_SQL, SCHEMA_SQL};

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250301_000001_initial::Migration)]
    }
}
