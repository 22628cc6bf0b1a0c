//! # keel-governance
//!
//! Decision and risk governance over a Keel store.
//!
//! [`Governance`] is the query façade. Mutations (create, update, supersede,
//! detach, link, delete) each run in one write transaction and append their
//! audit entries inside it. Risk queries read a project snapshot, run the
//! signal collectors over it and score every component; they never write.

pub mod chain;
mod components;
pub mod decisions;
pub mod error;
mod links;
mod risk;
pub mod scoring;
pub mod signals;

use keel_config::{KeelConfig, RiskConfig};
use keel_core::entities::AuditEntry;
use keel_db::Store;
use keel_db::error::DatabaseError;
use keel_db::repos::audit::AuditFilter;
use serde::Serialize;

pub use decisions::{NewDecision, Supersession};
pub use error::GovernanceError;
pub use keel_db::updates::decision::{DecisionUpdate, DecisionUpdateBuilder};

/// Query façade over one store with injected risk configuration.
pub struct Governance {
    store: Store,
    risk: RiskConfig,
}

impl Governance {
    /// # Errors
    ///
    /// Returns `Validation` if the risk configuration is inconsistent.
    pub fn new(store: Store, risk: RiskConfig) -> Result<Self, GovernanceError> {
        risk.validate()
            .map_err(|e| GovernanceError::Validation(e.to_string()))?;
        Ok(Self { store, risk })
    }

    /// Open the configured store.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the database cannot be opened, or
    /// `Validation` for an inconsistent risk configuration.
    pub async fn open(config: &KeelConfig) -> Result<Self, GovernanceError> {
        let store = Store::open_local(&config.storage.db_path, config.storage.timeout()).await?;
        Self::new(store, config.risk.clone())
    }

    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub const fn risk_config(&self) -> &RiskConfig {
        &self.risk
    }

    /// Audit entries matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the read fails.
    pub async fn audit_log(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, GovernanceError> {
        let reader = self.store.reader().await?;
        Ok(reader.query_audit(filter).await?)
    }
}

pub(crate) fn require_non_blank(field: &str, value: &str) -> Result<(), GovernanceError> {
    if value.trim().is_empty() {
        return Err(GovernanceError::Validation(format!("{field} must not be blank")));
    }
    Ok(())
}

pub(crate) fn to_detail<T: Serialize>(detail: &T) -> Result<serde_json::Value, GovernanceError> {
    serde_json::to_value(detail).map_err(|e| GovernanceError::Storage(DatabaseError::Other(e.into())))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn rejects_inconsistent_weights() {
        let store = Store::open_local(":memory:", Duration::from_secs(1))
            .await
            .unwrap();
        let risk = RiskConfig {
            commit_weight: 0.9,
            ..RiskConfig::default()
        };
        assert!(matches!(
            Governance::new(store, risk),
            Err(GovernanceError::Validation(_))
        ));
    }

    #[test]
    fn blank_fields_are_rejected() {
        assert!(require_non_blank("title", "  \t").is_err());
        assert!(require_non_blank("title", "x").is_ok());
    }
}
