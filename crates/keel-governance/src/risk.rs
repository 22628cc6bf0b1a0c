//! Risk queries. Read-only: signals are collected from a fresh snapshot on
//! every call and nothing derived is persisted.

use chrono::{DateTime, Utc};
use keel_core::enums::Severity;
use keel_core::metrics::ComponentRiskMetrics;

use crate::Governance;
use crate::components::require_component;
use crate::error::GovernanceError;
use crate::scoring::{ProjectSignals, score_component, score_project};
use crate::signals::RiskSnapshot;

impl Governance {
    /// # Errors
    ///
    /// Returns `NotFound` if the component is missing.
    pub async fn calculate_component_risk(
        &self,
        component_id: &str,
    ) -> Result<ComponentRiskMetrics, GovernanceError> {
        self.calculate_component_risk_at(component_id, Utc::now()).await
    }

    /// Score one component as of `as_of`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the component is missing.
    pub async fn calculate_component_risk_at(
        &self,
        component_id: &str,
        as_of: DateTime<Utc>,
    ) -> Result<ComponentRiskMetrics, GovernanceError> {
        let reader = self.store().reader().await?;
        let repo = reader.repo();
        let component = require_component(repo, component_id).await?;
        let snapshot = RiskSnapshot::load(repo, &component.project_id).await?;
        let signals = ProjectSignals::collect(&snapshot, as_of, self.risk_config());
        Ok(score_component(
            &component.id,
            signals.readings(&component.id),
            self.risk_config(),
        ))
    }

    /// # Errors
    ///
    /// Returns a storage error if the snapshot read fails.
    pub async fn calculate_project_risks(
        &self,
        project_id: &str,
    ) -> Result<Vec<ComponentRiskMetrics>, GovernanceError> {
        self.calculate_project_risks_at(project_id, Utc::now()).await
    }

    /// Score every component of a project, ordered by component id.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the snapshot read fails.
    pub async fn calculate_project_risks_at(
        &self,
        project_id: &str,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<ComponentRiskMetrics>, GovernanceError> {
        let reader = self.store().reader().await?;
        let snapshot = RiskSnapshot::load(reader.repo(), project_id).await?;
        drop(reader);
        let metrics = score_project(&snapshot, as_of, self.risk_config());
        tracing::debug!(project_id, components = metrics.len(), "scored project");
        Ok(metrics)
    }

    /// # Errors
    ///
    /// Returns a storage error if the snapshot read fails.
    pub async fn get_high_risk_components(
        &self,
        project_id: &str,
        min_severity: Severity,
    ) -> Result<Vec<ComponentRiskMetrics>, GovernanceError> {
        self.get_high_risk_components_at(project_id, min_severity, Utc::now())
            .await
    }

    /// Project metrics at or above `min_severity`, in component id order.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the snapshot read fails.
    pub async fn get_high_risk_components_at(
        &self,
        project_id: &str,
        min_severity: Severity,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<ComponentRiskMetrics>, GovernanceError> {
        let mut metrics = self.calculate_project_risks_at(project_id, as_of).await?;
        metrics.retain(|m| m.overall_severity >= min_severity);
        Ok(metrics)
    }
}
