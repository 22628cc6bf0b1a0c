//! Decision repository: rows, guarded supersession writes, project listing.

use chrono::{DateTime, Utc};

use keel_core::entities::DecisionRecord;
use keel_core::enums::DecisionStatus;

use crate::error::DatabaseError;
use crate::helpers::{encode_tags, fmt_datetime, get_opt_string, parse_datetime, parse_enum, parse_tags};
use crate::store::Repo;
use crate::updates::decision::DecisionUpdate;

pub(crate) const SELECT_COLS: &str = "id, project_id, title, context, decision, rationale, consequences, \
     status, supersedes, superseded_by, tags, created_by, created_at, updated_at";

pub(crate) fn row_to_decision(row: &libsql::Row) -> Result<DecisionRecord, DatabaseError> {
    Ok(DecisionRecord {
        id: row.get(0)?,
        project_id: row.get(1)?,
        title: row.get(2)?,
        context: row.get(3)?,
        decision: row.get(4)?,
        rationale: row.get(5)?,
        consequences: row.get(6)?,
        status: parse_enum(&row.get::<String>(7)?)?,
        supersedes: get_opt_string(row, 8)?,
        superseded_by: get_opt_string(row, 9)?,
        tags: parse_tags(&row.get::<String>(10)?)?,
        created_by: row.get(11)?,
        created_at: parse_datetime(&row.get::<String>(12)?)?,
        updated_at: parse_datetime(&row.get::<String>(13)?)?,
    })
}

async fn collect_decisions(mut rows: libsql::Rows) -> Result<Vec<DecisionRecord>, DatabaseError> {
    let mut decisions = Vec::new();
    while let Some(row) = rows.next().await? {
        decisions.push(row_to_decision(&row)?);
    }
    Ok(decisions)
}

impl Repo<'_> {
    /// Insert a fully-formed decision record.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails, including `CHECK` and
    /// `UNIQUE` violations on the supersession columns.
    pub async fn insert_decision(&self, record: &DecisionRecord) -> Result<(), DatabaseError> {
        let tags = encode_tags(&record.tags)?;
        self.timed("insert decision", async {
            self.conn()
                .execute(
                    &format!(
                        "INSERT INTO decisions ({SELECT_COLS})
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
                    ),
                    libsql::params![
                        record.id.as_str(),
                        record.project_id.as_str(),
                        record.title.as_str(),
                        record.context.as_str(),
                        record.decision.as_str(),
                        record.rationale.as_str(),
                        record.consequences.as_str(),
                        record.status.as_str(),
                        record.supersedes.as_deref(),
                        record.superseded_by.as_deref(),
                        tags.as_str(),
                        record.created_by.as_str(),
                        fmt_datetime(&record.created_at),
                        fmt_datetime(&record.updated_at)
                    ],
                )
                .await?;
            Ok(())
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or a row is malformed.
    pub async fn find_decision(&self, id: &str) -> Result<Option<DecisionRecord>, DatabaseError> {
        self.timed("find decision", async {
            let mut rows = self
                .conn()
                .query(
                    &format!("SELECT {SELECT_COLS} FROM decisions WHERE id = ?1"),
                    [id],
                )
                .await?;
            rows.next().await?.as_ref().map(row_to_decision).transpose()
        })
        .await
    }

    /// Decisions of a project, newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_decisions(
        &self,
        project_id: &str,
        status: Option<DecisionStatus>,
    ) -> Result<Vec<DecisionRecord>, DatabaseError> {
        self.timed("list decisions", async {
            let rows = match status {
                Some(status) => {
                    self.conn()
                        .query(
                            &format!(
                                "SELECT {SELECT_COLS} FROM decisions
                                 WHERE project_id = ?1 AND status = ?2
                                 ORDER BY created_at DESC, id DESC"
                            ),
                            [project_id, status.as_str()],
                        )
                        .await?
                }
                None => {
                    self.conn()
                        .query(
                            &format!(
                                "SELECT {SELECT_COLS} FROM decisions
                                 WHERE project_id = ?1
                                 ORDER BY created_at DESC, id DESC"
                            ),
                            [project_id],
                        )
                        .await?
                }
            };
            collect_decisions(rows).await
        })
        .await
    }

    /// Apply the `Some` fields of `update` as a dynamic SET clause.
    ///
    /// Returns the number of rows changed; `0` for an empty update.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the UPDATE fails.
    pub async fn update_decision(
        &self,
        id: &str,
        update: &DecisionUpdate,
        at: DateTime<Utc>,
    ) -> Result<u64, DatabaseError> {
        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        let text_fields = [
            ("title", &update.title),
            ("context", &update.context),
            ("decision", &update.decision),
            ("rationale", &update.rationale),
            ("consequences", &update.consequences),
        ];
        for (column, value) in text_fields {
            if let Some(value) = value {
                params.push(value.clone().into());
                sets.push(format!("{column} = ?{}", params.len()));
            }
        }
        if let Some(ref tags) = update.tags {
            params.push(encode_tags(tags)?.into());
            sets.push(format!("tags = ?{}", params.len()));
        }
        if let Some(status) = update.status {
            params.push(status.as_str().into());
            sets.push(format!("status = ?{}", params.len()));
        }

        if sets.is_empty() {
            return Ok(0);
        }

        params.push(fmt_datetime(&at).into());
        sets.push(format!("updated_at = ?{}", params.len()));
        params.push(id.into());
        let sql = format!(
            "UPDATE decisions SET {} WHERE id = ?{}",
            sets.join(", "),
            params.len()
        );

        self.timed("update decision", async {
            Ok(self
                .conn()
                .execute(&sql, libsql::params_from_iter(params))
                .await?)
        })
        .await
    }

    /// Mark `old_id` as superseded by `new_id`.
    ///
    /// Guarded on the record still being live and unchained forward; returns
    /// `0` when the guard fails, so a racing writer loses cleanly.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the UPDATE fails.
    pub async fn mark_superseded(
        &self,
        old_id: &str,
        new_id: &str,
        at: DateTime<Utc>,
    ) -> Result<u64, DatabaseError> {
        self.timed("mark superseded", async {
            Ok(self
                .conn()
                .execute(
                    "UPDATE decisions
                     SET status = 'superseded', superseded_by = ?2, updated_at = ?3
                     WHERE id = ?1 AND superseded_by IS NULL
                       AND status IN ('proposed', 'accepted')",
                    libsql::params![old_id, new_id, fmt_datetime(&at)],
                )
                .await?)
        })
        .await
    }

    /// Point `new_id` back at `old_id`. Guarded on `supersedes IS NULL`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the UPDATE fails.
    pub async fn set_supersedes(
        &self,
        new_id: &str,
        old_id: &str,
        at: DateTime<Utc>,
    ) -> Result<u64, DatabaseError> {
        self.timed("set supersedes", async {
            Ok(self
                .conn()
                .execute(
                    "UPDATE decisions SET supersedes = ?2, updated_at = ?3
                     WHERE id = ?1 AND supersedes IS NULL",
                    libsql::params![new_id, old_id, fmt_datetime(&at)],
                )
                .await?)
        })
        .await
    }

    /// Break the edge `old_id → new_id`, moving `old_id` to `deprecated`.
    ///
    /// Returns the number of rows changed across both writes.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if either UPDATE fails.
    pub async fn clear_supersession(
        &self,
        old_id: &str,
        new_id: &str,
        at: DateTime<Utc>,
    ) -> Result<u64, DatabaseError> {
        let at = fmt_datetime(&at);
        self.timed("clear supersession", async {
            let old = self
                .conn()
                .execute(
                    "UPDATE decisions
                     SET status = 'deprecated', superseded_by = NULL, updated_at = ?3
                     WHERE id = ?1 AND superseded_by = ?2",
                    libsql::params![old_id, new_id, at.as_str()],
                )
                .await?;
            let new = self
                .conn()
                .execute(
                    "UPDATE decisions SET supersedes = NULL, updated_at = ?3
                     WHERE id = ?1 AND supersedes = ?2",
                    libsql::params![new_id, old_id, at.as_str()],
                )
                .await?;
            Ok(old + new)
        })
        .await
    }

    /// IDs of other records whose supersession pointers name `id`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn decisions_referencing(&self, id: &str) -> Result<Vec<String>, DatabaseError> {
        self.timed("find referencing decisions", async {
            let mut rows = self
                .conn()
                .query(
                    "SELECT id FROM decisions
                     WHERE (supersedes = ?1 OR superseded_by = ?1) AND id != ?1
                     ORDER BY id",
                    [id],
                )
                .await?;
            let mut ids = Vec::new();
            while let Some(row) = rows.next().await? {
                ids.push(row.get::<String>(0)?);
            }
            Ok(ids)
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the DELETE fails.
    pub async fn delete_decision(&self, id: &str) -> Result<u64, DatabaseError> {
        self.timed("delete decision", async {
            Ok(self
                .conn()
                .execute("DELETE FROM decisions WHERE id = ?1", [id])
                .await?)
        })
        .await
    }
}
