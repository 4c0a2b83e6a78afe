//! Database migration runner for Billflow.
//!
//! Usage:
//!   migrator up      - Apply pending migrations (record store, dispatch log,
//!                      checkpoints, visibility profiles)
//!   migrator down    - Rollback last migration
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop all tables and re-run migrations
//!
//! The connection string is read from `DATABASE_URL`.

use billflow_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // sea-orm-migration sets up its own tracing
    cli::run_cli(Migrator).await;
}
