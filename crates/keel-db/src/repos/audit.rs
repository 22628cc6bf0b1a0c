//! Audit trail repository.
//!
//! Append-only audit entries recording every mutation. Supports dynamic
//! filtering by entity and action.

use keel_core::entities::AuditEntry;
use keel_core::enums::{AuditAction, EntityType};

use crate::error::DatabaseError;
use crate::helpers::{fmt_datetime, get_opt_string, parse_datetime, parse_enum, parse_optional_json};
use crate::store::Repo;

/// Filter criteria for audit queries.
#[derive(Debug, Default, Clone)]
pub struct AuditFilter {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<String>,
    pub action: Option<AuditAction>,
    pub limit: Option<u32>,
}

impl Repo<'_> {
    /// Append an audit entry. Called by every mutation inside its transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn append_audit(&self, entry: &AuditEntry) -> Result<(), DatabaseError> {
        let detail = entry.detail.as_ref().map(ToString::to_string);
        self.timed("append audit", async {
            self.conn()
                .execute(
                    "INSERT INTO audit_trail (id, entity_type, entity_id, action, detail, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    libsql::params![
                        entry.id.as_str(),
                        entry.entity_type.as_str(),
                        entry.entity_id.as_str(),
                        entry.action.as_str(),
                        detail.as_deref(),
                        fmt_datetime(&entry.created_at)
                    ],
                )
                .await?;
            Ok(())
        })
        .await
    }

    /// Query audit entries with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(entity_type) = filter.entity_type {
            params.push(entity_type.as_str().into());
            conditions.push(format!("entity_type = ?{}", params.len()));
        }
        if let Some(ref entity_id) = filter.entity_id {
            params.push(entity_id.clone().into());
            conditions.push(format!("entity_id = ?{}", params.len()));
        }
        if let Some(action) = filter.action {
            params.push(action.as_str().into());
            conditions.push(format!("action = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT id, entity_type, entity_id, action, detail, created_at
             FROM audit_trail {where_clause}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
        );

        self.timed("query audit", async {
            let mut rows = self
                .conn()
                .query(&sql, libsql::params_from_iter(params))
                .await?;
            let mut entries = Vec::new();
            while let Some(row) = rows.next().await? {
                entries.push(AuditEntry {
                    id: row.get::<String>(0)?,
                    entity_type: parse_enum(&row.get::<String>(1)?)?,
                    entity_id: row.get::<String>(2)?,
                    action: parse_enum(&row.get::<String>(3)?)?,
                    detail: parse_optional_json(get_opt_string(&row, 4)?.as_deref())?,
                    created_at: parse_datetime(&row.get::<String>(5)?)?,
                });
            }
            Ok(entries)
        })
        .await
    }
}
