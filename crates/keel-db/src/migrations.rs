//! Database migration runner.
//!
//! Embeds the SQL migration files at compile time and executes them on
//! database open. All statements use `IF NOT EXISTS` for idempotent re-running.

use crate::KeelDb;
use crate::error::DatabaseError;

/// Governance schema: 6 tables, 6 indexes.
const MIGRATION_001: &str = include_str!("../migrations/001_governance.sql");

impl KeelDb {
    /// Run all embedded migrations in sequence.
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(MIGRATION_001)
            .await
            .map_err(|e| DatabaseError::Migration(format!("001_governance: {e}")))?;
        Ok(())
    }
}
