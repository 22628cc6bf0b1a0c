//! Commit tag repository. Feeds the commit-churn signal.

use keel_core::entities::CommitTag;

use crate::error::DatabaseError;
use crate::helpers::{fmt_datetime, parse_datetime};
use crate::store::Repo;

impl Repo<'_> {
    /// Tag a commit to a component. Returns `false` if the pair was already tagged.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn insert_commit_tag(&self, tag: &CommitTag) -> Result<bool, DatabaseError> {
        self.timed("tag commit", async {
            let changed = self
                .conn()
                .execute(
                    "INSERT OR IGNORE INTO component_commits (component_id, commit_sha, committed_at)
                     VALUES (?1, ?2, ?3)",
                    libsql::params![
                        tag.component_id.as_str(),
                        tag.commit_sha.as_str(),
                        fmt_datetime(&tag.committed_at)
                    ],
                )
                .await?;
            Ok(changed > 0)
        })
        .await
    }

    /// All commit tags on a project's components.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn commit_tags_for_project(
        &self,
        project_id: &str,
    ) -> Result<Vec<CommitTag>, DatabaseError> {
        self.timed("snapshot commit tags", async {
            let mut rows = self
                .conn()
                .query(
                    "SELECT t.component_id, t.commit_sha, t.committed_at
                     FROM component_commits t
                     JOIN components c ON c.id = t.component_id
                     WHERE c.project_id = ?1
                     ORDER BY t.component_id, t.commit_sha",
                    [project_id],
                )
                .await?;
            let mut tags = Vec::new();
            while let Some(row) = rows.next().await? {
                tags.push(CommitTag {
                    component_id: row.get(0)?,
                    commit_sha: row.get(1)?,
                    committed_at: parse_datetime(&row.get::<String>(2)?)?,
                });
            }
            Ok(tags)
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the DELETE fails.
    pub async fn delete_commit_tags_for_component(
        &self,
        component_id: &str,
    ) -> Result<u64, DatabaseError> {
        self.timed("delete commit tags", async {
            Ok(self
                .conn()
                .execute(
                    "DELETE FROM component_commits WHERE component_id = ?1",
                    [component_id],
                )
                .await?)
        })
        .await
    }
}
