//! Component-decision link repository.
//!
//! The `(component_id, decision_id)` pair is the primary key, so inserts use
//! `INSERT OR IGNORE` and report whether a row was actually written.

use chrono::{DateTime, Utc};

use keel_core::entities::{ComponentDecisionLink, DecisionRecord};
use keel_core::enums::DecisionStatus;

use crate::error::DatabaseError;
use crate::helpers::{fmt_datetime, parse_datetime, parse_enum};
use crate::repos::decision::{SELECT_COLS as DECISION_COLS, row_to_decision};
use crate::store::Repo;

/// A link joined with the linked decision's status, scoped to one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedDecision {
    pub component_id: String,
    pub decision_id: String,
    pub status: DecisionStatus,
}

fn row_to_link(row: &libsql::Row) -> Result<ComponentDecisionLink, DatabaseError> {
    Ok(ComponentDecisionLink {
        component_id: row.get(0)?,
        decision_id: row.get(1)?,
        inferred: row.get::<i64>(2)? != 0,
        linked_at: parse_datetime(&row.get::<String>(3)?)?,
    })
}

impl Repo<'_> {
    /// Insert a link unless the pair already exists. Returns `true` if written.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn insert_link(
        &self,
        component_id: &str,
        decision_id: &str,
        inferred: bool,
        at: DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        self.timed("insert link", async {
            let changed = self
                .conn()
                .execute(
                    "INSERT OR IGNORE INTO component_decision_links
                     (component_id, decision_id, inferred, linked_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    libsql::params![component_id, decision_id, i64::from(inferred), fmt_datetime(&at)],
                )
                .await?;
            Ok(changed > 0)
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_link(
        &self,
        component_id: &str,
        decision_id: &str,
    ) -> Result<Option<ComponentDecisionLink>, DatabaseError> {
        self.timed("find link", async {
            let mut rows = self
                .conn()
                .query(
                    "SELECT component_id, decision_id, inferred, linked_at
                     FROM component_decision_links
                     WHERE component_id = ?1 AND decision_id = ?2",
                    [component_id, decision_id],
                )
                .await?;
            rows.next().await?.as_ref().map(row_to_link).transpose()
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the DELETE fails.
    pub async fn delete_link(
        &self,
        component_id: &str,
        decision_id: &str,
    ) -> Result<u64, DatabaseError> {
        self.timed("delete link", async {
            Ok(self
                .conn()
                .execute(
                    "DELETE FROM component_decision_links
                     WHERE component_id = ?1 AND decision_id = ?2",
                    [component_id, decision_id],
                )
                .await?)
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the DELETE fails.
    pub async fn delete_links_for_decision(&self, decision_id: &str) -> Result<u64, DatabaseError> {
        self.timed("delete decision links", async {
            Ok(self
                .conn()
                .execute(
                    "DELETE FROM component_decision_links WHERE decision_id = ?1",
                    [decision_id],
                )
                .await?)
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the DELETE fails.
    pub async fn delete_links_for_component(&self, component_id: &str) -> Result<u64, DatabaseError> {
        self.timed("delete component links", async {
            Ok(self
                .conn()
                .execute(
                    "DELETE FROM component_decision_links WHERE component_id = ?1",
                    [component_id],
                )
                .await?)
        })
        .await
    }

    /// Links held by one decision, ordered by component id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn links_for_decision(
        &self,
        decision_id: &str,
    ) -> Result<Vec<ComponentDecisionLink>, DatabaseError> {
        self.timed("list decision links", async {
            let mut rows = self
                .conn()
                .query(
                    "SELECT component_id, decision_id, inferred, linked_at
                     FROM component_decision_links
                     WHERE decision_id = ?1 ORDER BY component_id",
                    [decision_id],
                )
                .await?;
            let mut links = Vec::new();
            while let Some(row) = rows.next().await? {
                links.push(row_to_link(&row)?);
            }
            Ok(links)
        })
        .await
    }

    /// Decisions linked to a component, newest first (`created_at DESC, id DESC`).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn decisions_for_component(
        &self,
        component_id: &str,
    ) -> Result<Vec<DecisionRecord>, DatabaseError> {
        self.timed("list component decisions", async {
            let mut rows = self
                .conn()
                .query(
                    &format!(
                        "SELECT {DECISION_COLS} FROM decisions
                         JOIN component_decision_links l ON l.decision_id = decisions.id
                         WHERE l.component_id = ?1
                         ORDER BY decisions.created_at DESC, decisions.id DESC"
                    ),
                    [component_id],
                )
                .await?;
            let mut decisions = Vec::new();
            while let Some(row) = rows.next().await? {
                decisions.push(row_to_decision(&row)?);
            }
            Ok(decisions)
        })
        .await
    }

    /// Every link among a project's components, joined with decision status.
    ///
    /// Links whose decision row is gone are skipped by the join.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn linked_decisions_for_project(
        &self,
        project_id: &str,
    ) -> Result<Vec<LinkedDecision>, DatabaseError> {
        self.timed("snapshot project links", async {
            let mut rows = self
                .conn()
                .query(
                    "SELECT l.component_id, l.decision_id, d.status
                     FROM component_decision_links l
                     JOIN components c ON c.id = l.component_id
                     JOIN decisions d ON d.id = l.decision_id
                     WHERE c.project_id = ?1
                     ORDER BY l.component_id, l.decision_id",
                    [project_id],
                )
                .await?;
            let mut linked = Vec::new();
            while let Some(row) = rows.next().await? {
                linked.push(LinkedDecision {
                    component_id: row.get(0)?,
                    decision_id: row.get(1)?,
                    status: parse_enum(&row.get::<String>(2)?)?,
                });
            }
            Ok(linked)
        })
        .await
    }
}
