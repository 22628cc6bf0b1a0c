//! Store handle, deadline-wrapped repository access, and write transactions.
//!
//! `Store` wraps `KeelDb` with the caller-supplied store deadline and a
//! read/write gate. All repository methods live on [`Repo`] via `impl Repo`
//! blocks in `repos/`, so the same SQL runs behind a [`Reader`] or inside a
//! [`WriteTx`].
//!
//! Readers and the writer share one connection, so a reader holds the gate
//! shared and a writer holds it exclusively. A reader never observes a
//! transaction that has not committed or rolled back.
//!
//! Every mutation follows this protocol:
//! 1. Acquire the gate exclusively (bounded by the deadline)
//! 2. `BEGIN IMMEDIATE`
//! 3. Read, validate, write
//! 4. Append audit entry (inside the transaction)
//! 5. Commit, or roll back on any error

use std::future::Future;
use std::ops::Deref;
use std::time::Duration;

use chrono::{DateTime, Utc};
use keel_core::entities::AuditEntry;
use keel_core::enums::{AuditAction, EntityType};
use keel_core::ids::PREFIX_AUDIT;
use libsql::TransactionBehavior;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::KeelDb;
use crate::error::DatabaseError;

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Await `fut` for at most `timeout`, mapping expiry to `DatabaseError::Timeout`.
async fn with_deadline<T, F>(
    operation: &'static str,
    timeout: Duration,
    fut: F,
) -> Result<T, DatabaseError>
where
    F: Future<Output = Result<T, DatabaseError>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| DatabaseError::Timeout {
            operation,
            timeout_ms: millis(timeout),
        })?
}

/// Shared store handle for one database.
pub struct Store {
    db: KeelDb,
    timeout: Duration,
    gate: RwLock<()>,
}

impl Store {
    /// Open a local store.
    ///
    /// # Arguments
    ///
    /// * `db_path`: path to the libSQL database file, or `":memory:"` for tests.
    /// * `timeout`: deadline applied to every store call.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn open_local(db_path: &str, timeout: Duration) -> Result<Self, DatabaseError> {
        let db = KeelDb::open_local(db_path).await?;
        Ok(Self::from_db(db, timeout))
    }

    /// Create from an existing `KeelDb`.
    #[must_use]
    pub fn from_db(db: KeelDb, timeout: Duration) -> Self {
        Self {
            db,
            timeout,
            gate: RwLock::new(()),
        }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &KeelDb {
        &self.db
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Acquire the gate shared, waiting out any open write transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Timeout` if a writer holds the gate past the
    /// deadline.
    pub async fn reader(&self) -> Result<Reader<'_>, DatabaseError> {
        let gate = tokio::time::timeout(self.timeout, self.gate.read())
            .await
            .map_err(|_| DatabaseError::Timeout {
                operation: "acquire read gate",
                timeout_ms: millis(self.timeout),
            })?;
        Ok(Reader {
            repo: self.autocommit(),
            _gate: gate,
        })
    }

    /// Repository over the plain connection with no gate held.
    pub(crate) const fn autocommit(&self) -> Repo<'_> {
        Repo {
            conn: self.db.conn(),
            timeout: self.timeout,
        }
    }

    /// Acquire the gate exclusively and open an immediate transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Timeout` if the gate is not acquired within the
    /// deadline, or `DatabaseError` if `BEGIN` fails.
    pub async fn begin_write(&self) -> Result<WriteTx<'_>, DatabaseError> {
        let gate = tokio::time::timeout(self.timeout, self.gate.write())
            .await
            .map_err(|_| DatabaseError::Timeout {
                operation: "acquire write gate",
                timeout_ms: millis(self.timeout),
            })?;

        let tx = with_deadline("begin transaction", self.timeout, async {
            Ok(self
                .db
                .conn()
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .await?)
        })
        .await?;

        Ok(WriteTx {
            tx,
            timeout: self.timeout,
            _gate: gate,
        })
    }
}

/// Shared hold on the gate. Derefs to the [`Repo`] it guards.
pub struct Reader<'s> {
    repo: Repo<'s>,
    _gate: RwLockReadGuard<'s, ()>,
}

impl<'s> Reader<'s> {
    /// The guarded repository. Only valid while this reader is alive.
    #[must_use]
    pub const fn repo(&self) -> Repo<'s> {
        self.repo
    }
}

impl<'s> Deref for Reader<'s> {
    type Target = Repo<'s>;

    fn deref(&self) -> &Self::Target {
        &self.repo
    }
}

/// An open write transaction holding the store's gate exclusively.
///
/// Dropping it without [`WriteTx::commit`] releases the gate; callers should
/// prefer [`WriteTx::finish`] so the transaction is explicitly rolled back.
/// `tx` is declared first so it rolls back before the gate is released.
pub struct WriteTx<'s> {
    tx: libsql::Transaction,
    timeout: Duration,
    _gate: RwLockWriteGuard<'s, ()>,
}

impl WriteTx<'_> {
    /// Repository bound to this transaction.
    #[must_use]
    pub fn repo(&self) -> Repo<'_> {
        Repo {
            conn: &self.tx,
            timeout: self.timeout,
        }
    }

    /// Commit the transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the commit fails or times out.
    pub async fn commit(self) -> Result<(), DatabaseError> {
        let timeout = self.timeout;
        with_deadline("commit", timeout, async { Ok(self.tx.commit().await?) }).await
    }

    /// Roll the transaction back. A failed rollback is logged, not returned,
    /// so it never masks the error that caused it.
    pub async fn rollback(self) {
        if let Err(error) = self.tx.rollback().await {
            tracing::warn!(%error, "rollback failed");
        }
    }

    /// Commit on `Ok`, roll back on `Err`, and hand the result back.
    ///
    /// # Errors
    ///
    /// Returns the original error, or a commit failure converted into `E`.
    pub async fn finish<T, E>(self, result: Result<T, E>) -> Result<T, E>
    where
        E: From<DatabaseError>,
    {
        match result {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(error) => {
                self.rollback().await;
                Err(error)
            }
        }
    }
}

/// Repository methods over one connection with a per-call deadline.
#[derive(Clone, Copy)]
pub struct Repo<'c> {
    conn: &'c libsql::Connection,
    timeout: Duration,
}

impl<'c> Repo<'c> {
    #[must_use]
    pub const fn conn(&self) -> &'c libsql::Connection {
        self.conn
    }

    /// Run a store call under this repo's deadline.
    pub(crate) async fn timed<T, F>(&self, operation: &'static str, fut: F) -> Result<T, DatabaseError>
    where
        F: Future<Output = Result<T, DatabaseError>>,
    {
        with_deadline(operation, self.timeout, fut).await
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"dec-a3f8b2c1"`.
    ///
    /// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        self.timed("generate id", async {
            let mut rows = self
                .conn
                .query("SELECT ?1 || '-' || lower(hex(randomblob(4)))", [prefix])
                .await?;
            let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
            Ok(row.get::<String>(0)?)
        })
        .await
    }

    /// Build and append an audit entry for a mutation.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if ID generation or the INSERT fails.
    pub async fn record_audit(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        action: AuditAction,
        detail: Option<serde_json::Value>,
        at: DateTime<Utc>,
    ) -> Result<AuditEntry, DatabaseError> {
        let entry = AuditEntry {
            id: self.generate_id(PREFIX_AUDIT).await?,
            entity_type,
            entity_id: entity_id.to_string(),
            action,
            detail,
            created_at: at,
        };
        self.append_audit(&entry).await?;
        Ok(entry)
    }
}
