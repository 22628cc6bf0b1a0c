//! Component repository.

use keel_core::entities::Component;

use crate::error::DatabaseError;
use crate::helpers::{fmt_datetime, parse_datetime, parse_enum};
use crate::store::Repo;

const SELECT_COLS: &str = "id, project_id, name, kind, created_at";

fn row_to_component(row: &libsql::Row) -> Result<Component, DatabaseError> {
    Ok(Component {
        id: row.get(0)?,
        project_id: row.get(1)?,
        name: row.get(2)?,
        kind: parse_enum(&row.get::<String>(3)?)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

impl Repo<'_> {
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn insert_component(&self, component: &Component) -> Result<(), DatabaseError> {
        self.timed("insert component", async {
            self.conn()
                .execute(
                    &format!("INSERT INTO components ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
                    libsql::params![
                        component.id.as_str(),
                        component.project_id.as_str(),
                        component.name.as_str(),
                        component.kind.as_str(),
                        fmt_datetime(&component.created_at)
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
    pub async fn find_component(&self, id: &str) -> Result<Option<Component>, DatabaseError> {
        self.timed("find component", async {
            let mut rows = self
                .conn()
                .query(
                    &format!("SELECT {SELECT_COLS} FROM components WHERE id = ?1"),
                    [id],
                )
                .await?;
            rows.next().await?.as_ref().map(row_to_component).transpose()
        })
        .await
    }

    /// Components of a project ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_components(&self, project_id: &str) -> Result<Vec<Component>, DatabaseError> {
        self.timed("list components", async {
            let mut rows = self
                .conn()
                .query(
                    &format!(
                        "SELECT {SELECT_COLS} FROM components WHERE project_id = ?1 ORDER BY id"
                    ),
                    [project_id],
                )
                .await?;
            let mut components = Vec::new();
            while let Some(row) = rows.next().await? {
                components.push(row_to_component(&row)?);
            }
            Ok(components)
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the DELETE fails.
    pub async fn delete_component(&self, id: &str) -> Result<u64, DatabaseError> {
        self.timed("delete component", async {
            Ok(self
                .conn()
                .execute("DELETE FROM components WHERE id = ?1", [id])
                .await?)
        })
        .await
    }
}
