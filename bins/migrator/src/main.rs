//! Database migration runner for Ledgerlens.
//!
//! Reads `DATABASE_URL` (or `.env`). Usage:
//!   migrator up      - Create the reporting schema
//!   migrator down    - Drop the reporting schema
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop all tables and re-run migrations

use ledgerlens_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // The CLI sets up its own tracing
    cli::run_cli(Migrator).await;
}
