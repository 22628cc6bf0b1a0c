//! # keel-db
//!
//! libSQL store adapter for Keel governance state.
//!
//! Persists decision records, components, component-decision links, commit
//! tags, discussion threads and the audit trail. Reads and writes go through
//! [`store::Repo`], which wraps every call in the store's deadline; multi-record
//! mutations go through [`store::WriteTx`], a single `BEGIN IMMEDIATE`
//! transaction serialized behind the store's write gate.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod store;
pub mod updates;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

pub use store::{Reader, Repo, Store, WriteTx};

/// Raw database handle: one libSQL database and its connection.
pub struct KeelDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl KeelDb {
    /// Open a local database at the given path (`":memory:"` for tests).
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        let keel_db = Self { db, conn };
        keel_db.run_migrations().await?;
        tracing::debug!(path, "opened keel database");
        Ok(keel_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}
