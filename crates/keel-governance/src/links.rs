//! Component link registry.

use chrono::{DateTime, Utc};
use keel_core::audit_detail::LinkedDetail;
use keel_core::entities::{ComponentDecisionLink, DecisionRecord};
use keel_core::enums::{AuditAction, EntityType};
use keel_db::Repo;
use keel_db::error::DatabaseError;

use crate::components::require_component;
use crate::decisions::require_decision;
use crate::error::GovernanceError;
use crate::{Governance, to_detail};

fn link_entity_id(component_id: &str, decision_id: &str) -> String {
    format!("{component_id}:{decision_id}")
}

impl Governance {
    /// Link a decision to a component. A repeated call returns the existing link.
    ///
    /// # Errors
    ///
    /// - `NotFound` if either record is missing.
    /// - `Validation` if they belong to different projects.
    pub async fn link_to_component(
        &self,
        decision_id: &str,
        component_id: &str,
    ) -> Result<ComponentDecisionLink, GovernanceError> {
        let tx = self.store().begin_write().await?;
        let result = Self::checked_link_in(tx.repo(), decision_id, component_id, false).await;
        tx.finish(result).await
    }

    /// Like [`Governance::link_to_component`], flagging the link as inferred by
    /// an ingestion source rather than requested by a user.
    ///
    /// # Errors
    ///
    /// Same as [`Governance::link_to_component`].
    pub async fn link_inferred(
        &self,
        decision_id: &str,
        component_id: &str,
    ) -> Result<ComponentDecisionLink, GovernanceError> {
        let tx = self.store().begin_write().await?;
        let result = Self::checked_link_in(tx.repo(), decision_id, component_id, true).await;
        tx.finish(result).await
    }

    async fn checked_link_in(
        repo: Repo<'_>,
        decision_id: &str,
        component_id: &str,
        inferred: bool,
    ) -> Result<ComponentDecisionLink, GovernanceError> {
        let decision = require_decision(repo, decision_id).await?;
        let component = require_component(repo, component_id).await?;
        if decision.project_id != component.project_id {
            return Err(GovernanceError::Validation(format!(
                "decision '{decision_id}' is in project '{}' but component '{component_id}' is in '{}'",
                decision.project_id, component.project_id
            )));
        }
        Self::link_in(repo, decision_id, component_id, inferred, Utc::now()).await?;
        repo.find_link(component_id, decision_id)
            .await?
            .ok_or(GovernanceError::Storage(DatabaseError::NoResult))
    }

    /// Insert the link and audit it. Returns `false` if it already existed.
    pub(crate) async fn link_in(
        repo: Repo<'_>,
        decision_id: &str,
        component_id: &str,
        inferred: bool,
        now: DateTime<Utc>,
    ) -> Result<bool, GovernanceError> {
        if !repo.insert_link(component_id, decision_id, inferred, now).await? {
            return Ok(false);
        }
        let detail = LinkedDetail {
            component_id: component_id.to_string(),
            decision_id: decision_id.to_string(),
            inferred,
        };
        repo.record_audit(
            EntityType::ComponentLink,
            &link_entity_id(component_id, decision_id),
            AuditAction::Linked,
            Some(to_detail(&detail)?),
            now,
        )
        .await?;
        tracing::debug!(decision_id, component_id, inferred, "linked decision");
        Ok(true)
    }

    /// Remove a link. Returns `false` when there was nothing to remove.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails.
    pub async fn unlink_from_component(
        &self,
        decision_id: &str,
        component_id: &str,
    ) -> Result<bool, GovernanceError> {
        let tx = self.store().begin_write().await?;
        let result = Self::unlink_in(tx.repo(), decision_id, component_id).await;
        tx.finish(result).await
    }

    async fn unlink_in(
        repo: Repo<'_>,
        decision_id: &str,
        component_id: &str,
    ) -> Result<bool, GovernanceError> {
        let Some(link) = repo.find_link(component_id, decision_id).await? else {
            return Ok(false);
        };
        repo.delete_link(component_id, decision_id).await?;
        let detail = LinkedDetail {
            component_id: link.component_id,
            decision_id: link.decision_id,
            inferred: link.inferred,
        };
        repo.record_audit(
            EntityType::ComponentLink,
            &link_entity_id(component_id, decision_id),
            AuditAction::Unlinked,
            Some(to_detail(&detail)?),
            Utc::now(),
        )
        .await?;
        Ok(true)
    }

    /// Decisions linked to a component, newest first.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the component is missing.
    pub async fn get_decisions_by_component(
        &self,
        component_id: &str,
    ) -> Result<Vec<DecisionRecord>, GovernanceError> {
        let reader = self.store().reader().await?;
        let repo = reader.repo();
        require_component(repo, component_id).await?;
        Ok(repo.decisions_for_component(component_id).await?)
    }
}
