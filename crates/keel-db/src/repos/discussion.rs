//! Discussion thread repository. Feeds the discussion-volume signal.

use keel_core::entities::DiscussionThread;
use keel_core::enums::{AnchorType, DiscussionStatus};

use crate::error::DatabaseError;
use crate::helpers::{fmt_datetime, parse_datetime, parse_enum};
use crate::store::Repo;

const SELECT_COLS: &str = "id, project_id, anchor_type, anchor_id, title, status, created_at";

fn row_to_thread(row: &libsql::Row) -> Result<DiscussionThread, DatabaseError> {
    Ok(DiscussionThread {
        id: row.get(0)?,
        project_id: row.get(1)?,
        anchor_type: parse_enum(&row.get::<String>(2)?)?,
        anchor_id: row.get(3)?,
        title: row.get(4)?,
        status: parse_enum(&row.get::<String>(5)?)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

impl Repo<'_> {
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn insert_discussion(&self, thread: &DiscussionThread) -> Result<(), DatabaseError> {
        self.timed("insert discussion", async {
            self.conn()
                .execute(
                    &format!(
                        "INSERT INTO discussions ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                    ),
                    libsql::params![
                        thread.id.as_str(),
                        thread.project_id.as_str(),
                        thread.anchor_type.as_str(),
                        thread.anchor_id.as_str(),
                        thread.title.as_str(),
                        thread.status.as_str(),
                        fmt_datetime(&thread.created_at)
                    ],
                )
                .await?;
            Ok(())
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_discussion(&self, id: &str) -> Result<Option<DiscussionThread>, DatabaseError> {
        self.timed("find discussion", async {
            let mut rows = self
                .conn()
                .query(
                    &format!("SELECT {SELECT_COLS} FROM discussions WHERE id = ?1"),
                    [id],
                )
                .await?;
            rows.next().await?.as_ref().map(row_to_thread).transpose()
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the UPDATE fails.
    pub async fn set_discussion_status(
        &self,
        id: &str,
        status: DiscussionStatus,
    ) -> Result<u64, DatabaseError> {
        self.timed("set discussion status", async {
            Ok(self
                .conn()
                .execute(
                    "UPDATE discussions SET status = ?2 WHERE id = ?1",
                    [id, status.as_str()],
                )
                .await?)
        })
        .await
    }

    /// Open threads of a project, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn open_discussions_for_project(
        &self,
        project_id: &str,
    ) -> Result<Vec<DiscussionThread>, DatabaseError> {
        self.timed("snapshot open discussions", async {
            let mut rows = self
                .conn()
                .query(
                    &format!(
                        "SELECT {SELECT_COLS} FROM discussions
                         WHERE project_id = ?1 AND status = 'open'
                         ORDER BY id"
                    ),
                    [project_id],
                )
                .await?;
            let mut threads = Vec::new();
            while let Some(row) = rows.next().await? {
                threads.push(row_to_thread(&row)?);
            }
            Ok(threads)
        })
        .await
    }

    /// Remove every thread anchored to the given entity.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the DELETE fails.
    pub async fn delete_discussions_for_anchor(
        &self,
        anchor_type: AnchorType,
        anchor_id: &str,
    ) -> Result<u64, DatabaseError> {
        self.timed("delete anchored discussions", async {
            Ok(self
                .conn()
                .execute(
                    "DELETE FROM discussions WHERE anchor_type = ?1 AND anchor_id = ?2",
                    [anchor_type.as_str(), anchor_id],
                )
                .await?)
        })
        .await
    }
}
