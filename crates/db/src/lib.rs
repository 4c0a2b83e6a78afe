//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Implementations of the core record, checkpoint and profile stores
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{BillRecordRepository, CheckpointRepository, ProfileRepository};

use billflow_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a pooled connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .sqlx_logging(false);
    Database::connect(options).await
}
