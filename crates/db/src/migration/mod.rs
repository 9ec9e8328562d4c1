//! Database migrations for the reporting schema.
//!
//! Run with the `migrator` binary (sea-orm-migration CLI).

pub use sea_orm_migration::prelude::*;

mod m20260108_000001_initial;

/// Migrator for the reporting schema.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260108_000001_initial::Migration)]
    }
}
