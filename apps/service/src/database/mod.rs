/// Persistence layer for the target list.
pub mod migrations;
pub mod models;
pub mod repository;

pub use repository::{TargetRepository, TargetStore};

use anyhow::Result;

/// Initialize database with schema
pub async fn initialize_database(conn: &libsql::Connection) -> Result<()> {
    migrations::run_migrations(conn).await
}
