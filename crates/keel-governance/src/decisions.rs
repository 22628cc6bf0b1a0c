//! Supersession chain manager: decision lifecycle, supersede, detach, chain reads.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use keel_core::audit_detail::{StatusChangedDetail, SupersessionDetail};
use keel_core::entities::DecisionRecord;
use keel_core::enums::{AnchorType, AuditAction, DecisionStatus, EntityType};
use keel_core::ids::PREFIX_DECISION;
use keel_db::Repo;
use keel_db::updates::decision::DecisionUpdate;
use serde::{Deserialize, Serialize};

use crate::chain::{SupersessionGraph, walk_chain};
use crate::error::GovernanceError;
use crate::{Governance, require_non_blank, to_detail};

/// Input for [`Governance::create_decision`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewDecision {
    pub project_id: String,
    pub title: String,
    pub context: String,
    pub decision: String,
    pub rationale: String,
    pub consequences: String,
    pub created_by: String,
    /// `proposed` when absent; only `proposed` or `accepted` are accepted.
    #[serde(default)]
    pub status: Option<DecisionStatus>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Components to link atomically with the new record.
    #[serde(default)]
    pub linked_component_ids: Vec<String>,
}

/// Both records of a completed supersession.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Supersession {
    pub superseded: DecisionRecord,
    pub successor: DecisionRecord,
}

/// Trim tags and drop blank ones.
fn normalize_tags(tags: &BTreeSet<String>) -> BTreeSet<String> {
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Write both pointers of `old → new`. Each write is guarded on the row
/// still being unchained; a zero-row write aborts the caller's transaction.
async fn write_supersession_edge(
    repo: Repo<'_>,
    old: &DecisionRecord,
    new: &DecisionRecord,
    now: DateTime<Utc>,
) -> Result<(), GovernanceError> {
    if repo.mark_superseded(&old.id, &new.id, now).await? == 0 {
        tracing::warn!(old_id = %old.id, new_id = %new.id, "supersede lost a race on the old record");
        return Err(GovernanceError::invalid_decision(
            &old.id,
            old.status,
            "record changed concurrently",
        ));
    }
    if repo.set_supersedes(&new.id, &old.id, now).await? == 0 {
        tracing::warn!(old_id = %old.id, new_id = %new.id, "supersede lost a race on the new record");
        return Err(GovernanceError::invalid_decision(
            &new.id,
            new.status,
            "record changed concurrently",
        ));
    }
    Ok(())
}

pub(crate) async fn require_decision(
    repo: Repo<'_>,
    id: &str,
) -> Result<DecisionRecord, GovernanceError> {
    repo.find_decision(id)
        .await?
        .ok_or_else(|| GovernanceError::not_found(EntityType::Decision, id))
}

impl Governance {
    /// Create a decision record, optionally linked to components.
    ///
    /// # Errors
    ///
    /// - `Validation` for a blank required field, a disallowed initial status,
    ///   or a component that is missing or in another project.
    pub async fn create_decision(
        &self,
        input: NewDecision,
    ) -> Result<DecisionRecord, GovernanceError> {
        for (field, value) in [
            ("project_id", &input.project_id),
            ("title", &input.title),
            ("context", &input.context),
            ("decision", &input.decision),
            ("rationale", &input.rationale),
            ("consequences", &input.consequences),
            ("created_by", &input.created_by),
        ] {
            require_non_blank(field, value)?;
        }
        let status = match input.status {
            None => DecisionStatus::Proposed,
            Some(s @ (DecisionStatus::Proposed | DecisionStatus::Accepted)) => s,
            Some(other) => {
                return Err(GovernanceError::Validation(format!(
                    "initial status must be proposed or accepted, got {other}"
                )));
            }
        };

        let tx = self.store().begin_write().await?;
        let result = Self::create_in(tx.repo(), &input, status, Utc::now()).await;
        let record = tx.finish(result).await?;
        tracing::debug!(id = %record.id, project_id = %record.project_id, "created decision");
        Ok(record)
    }

    async fn create_in(
        repo: Repo<'_>,
        input: &NewDecision,
        status: DecisionStatus,
        now: DateTime<Utc>,
    ) -> Result<DecisionRecord, GovernanceError> {
        let component_ids: BTreeSet<&str> = input
            .linked_component_ids
            .iter()
            .map(String::as_str)
            .collect();
        for component_id in &component_ids {
            match repo.find_component(component_id).await? {
                Some(c) if c.project_id == input.project_id => {}
                Some(c) => {
                    return Err(GovernanceError::Validation(format!(
                        "component '{component_id}' belongs to project '{}', not '{}'",
                        c.project_id, input.project_id
                    )));
                }
                None => {
                    return Err(GovernanceError::Validation(format!(
                        "component '{component_id}' does not exist"
                    )));
                }
            }
        }

        let record = DecisionRecord {
            id: repo.generate_id(PREFIX_DECISION).await?,
            project_id: input.project_id.clone(),
            title: input.title.clone(),
            context: input.context.clone(),
            decision: input.decision.clone(),
            rationale: input.rationale.clone(),
            consequences: input.consequences.clone(),
            status,
            supersedes: None,
            superseded_by: None,
            tags: normalize_tags(&input.tags),
            created_by: input.created_by.clone(),
            created_at: now,
            updated_at: now,
        };
        repo.insert_decision(&record).await?;
        repo.record_audit(EntityType::Decision, &record.id, AuditAction::Created, None, now)
            .await?;

        for component_id in component_ids {
            Self::link_in(repo, &record.id, component_id, false, now).await?;
        }
        Ok(record)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the record is missing.
    /// - `Validation` if a provided text field is blank.
    /// - `InvalidState` if content of a superseded record would change, or the
    ///   status change is not an allowed transition.
    pub async fn update_decision(
        &self,
        id: &str,
        update: DecisionUpdate,
    ) -> Result<DecisionRecord, GovernanceError> {
        for (field, value) in update.text_fields() {
            require_non_blank(field, value)?;
        }
        let tx = self.store().begin_write().await?;
        let result = Self::update_in(tx.repo(), id, update, Utc::now()).await;
        tx.finish(result).await
    }

    async fn update_in(
        repo: Repo<'_>,
        id: &str,
        mut update: DecisionUpdate,
        now: DateTime<Utc>,
    ) -> Result<DecisionRecord, GovernanceError> {
        let current = require_decision(repo, id).await?;

        if current.status.is_content_frozen() && update.touches_content() {
            return Err(GovernanceError::invalid_decision(
                id,
                current.status,
                "content of a superseded decision is frozen",
            ));
        }
        if update.status == Some(current.status) {
            update.status = None;
        }
        if let Some(next) = update.status {
            if next == DecisionStatus::Superseded {
                return Err(GovernanceError::invalid_decision(
                    id,
                    current.status,
                    "use supersede to mark a decision superseded",
                ));
            }
            if !current.status.can_transition_to(next) {
                return Err(GovernanceError::invalid_decision(
                    id,
                    current.status,
                    format!("cannot transition to {next}"),
                ));
            }
        }
        if let Some(ref tags) = update.tags {
            update.tags = Some(normalize_tags(tags));
        }
        if update.is_empty() {
            return Ok(current);
        }

        repo.update_decision(id, &update, now).await?;
        repo.record_audit(
            EntityType::Decision,
            id,
            AuditAction::Updated,
            Some(to_detail(&update)?),
            now,
        )
        .await?;
        if let Some(next) = update.status {
            let detail = StatusChangedDetail {
                from: current.status.as_str().to_string(),
                to: next.as_str().to_string(),
            };
            repo.record_audit(
                EntityType::Decision,
                id,
                AuditAction::StatusChanged,
                Some(to_detail(&detail)?),
                now,
            )
            .await?;
        }

        tracing::debug!(id, "updated decision");
        require_decision(repo, id).await
    }

    /// Mark `old_id` superseded by `new_id`.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the ids are equal, `old_id` is not live, or `new_id`
    ///   already supersedes another record.
    /// - `NotFound` if either record is missing.
    /// - `Validation` if the records belong to different projects.
    /// - `Cycle` if the new edge would close a cycle.
    pub async fn supersede(
        &self,
        old_id: &str,
        new_id: &str,
    ) -> Result<Supersession, GovernanceError> {
        let tx = self.store().begin_write().await?;
        let result = Self::supersede_in(tx.repo(), old_id, new_id, Utc::now()).await;
        let outcome = tx.finish(result).await?;
        tracing::debug!(old_id, new_id, "superseded decision");
        Ok(outcome)
    }

    async fn supersede_in(
        repo: Repo<'_>,
        old_id: &str,
        new_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Supersession, GovernanceError> {
        let old = require_decision(repo, old_id).await?;
        if old_id == new_id {
            return Err(GovernanceError::invalid_decision(
                old_id,
                old.status,
                "a decision cannot supersede itself",
            ));
        }
        let new = require_decision(repo, new_id).await?;

        if old.project_id != new.project_id {
            return Err(GovernanceError::Validation(format!(
                "'{old_id}' and '{new_id}' belong to different projects"
            )));
        }
        match old.status {
            DecisionStatus::Superseded => {
                let by = old.superseded_by.as_deref().unwrap_or("unknown");
                return Err(GovernanceError::invalid_decision(
                    old_id,
                    old.status,
                    format!("already superseded by '{by}'"),
                ));
            }
            DecisionStatus::Deprecated => {
                return Err(GovernanceError::invalid_decision(
                    old_id,
                    old.status,
                    "a deprecated decision cannot be superseded",
                ));
            }
            DecisionStatus::Proposed | DecisionStatus::Accepted => {}
        }

        let project = repo.list_decisions(&old.project_id, None).await?;
        let graph = SupersessionGraph::from_records(&project);
        if let Some(path) = graph.existing_cycle() {
            tracing::warn!(project_id = %old.project_id, ?path, "stored supersession pointers form a cycle");
            return Err(GovernanceError::Cycle {
                id: path[0].clone(),
                path,
            });
        }
        if let Some(path) = graph.cycle_through(old_id, new_id) {
            return Err(GovernanceError::Cycle {
                id: new_id.to_string(),
                path,
            });
        }

        if let Some(ref previous) = new.supersedes {
            return Err(GovernanceError::invalid_decision(
                new_id,
                new.status,
                format!("already supersedes '{previous}'"),
            ));
        }

        write_supersession_edge(repo, &old, &new, now).await?;

        let detail = SupersessionDetail {
            old_id: old_id.to_string(),
            new_id: new_id.to_string(),
        };
        repo.record_audit(
            EntityType::Decision,
            old_id,
            AuditAction::Superseded,
            Some(to_detail(&detail)?),
            now,
        )
        .await?;

        Ok(Supersession {
            superseded: require_decision(repo, old_id).await?,
            successor: require_decision(repo, new_id).await?,
        })
    }

    /// Break the supersession edge out of `old_id`, deprecating it.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the record is missing.
    /// - `InvalidState` if the record is not superseded.
    pub async fn detach_supersession(&self, old_id: &str) -> Result<DecisionRecord, GovernanceError> {
        let tx = self.store().begin_write().await?;
        let result = Self::detach_in(tx.repo(), old_id, Utc::now()).await;
        tx.finish(result).await
    }

    async fn detach_in(
        repo: Repo<'_>,
        old_id: &str,
        now: DateTime<Utc>,
    ) -> Result<DecisionRecord, GovernanceError> {
        let old = require_decision(repo, old_id).await?;
        let Some(new_id) = old.superseded_by.clone() else {
            return Err(GovernanceError::invalid_decision(
                old_id,
                old.status,
                "only a superseded decision can be detached",
            ));
        };

        if repo.clear_supersession(old_id, &new_id, now).await? == 0 {
            return Err(GovernanceError::invalid_decision(
                old_id,
                old.status,
                "record changed concurrently",
            ));
        }
        let detail = SupersessionDetail {
            old_id: old_id.to_string(),
            new_id,
        };
        repo.record_audit(
            EntityType::Decision,
            old_id,
            AuditAction::Detached,
            Some(to_detail(&detail)?),
            now,
        )
        .await?;

        tracing::debug!(old_id, "detached supersession");
        require_decision(repo, old_id).await
    }

    /// Delete an unchained decision with its links and anchored discussions.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the record is missing.
    /// - `InvalidState` if the record is part of a supersession chain.
    pub async fn delete_decision(&self, id: &str) -> Result<(), GovernanceError> {
        let tx = self.store().begin_write().await?;
        let result = Self::delete_in(tx.repo(), id, Utc::now()).await;
        tx.finish(result).await
    }

    async fn delete_in(repo: Repo<'_>, id: &str, now: DateTime<Utc>) -> Result<(), GovernanceError> {
        let record = require_decision(repo, id).await?;
        let referencing = repo.decisions_referencing(id).await?;
        if record.is_chained() || !referencing.is_empty() {
            return Err(GovernanceError::invalid_decision(
                id,
                record.status,
                "detach the supersession chain before deleting",
            ));
        }

        let links = repo.delete_links_for_decision(id).await?;
        let threads = repo
            .delete_discussions_for_anchor(AnchorType::Decision, id)
            .await?;
        repo.delete_decision(id).await?;
        repo.record_audit(EntityType::Decision, id, AuditAction::Deleted, None, now)
            .await?;

        tracing::debug!(id, links, threads, "deleted decision");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the record is missing.
    pub async fn get_decision_by_id(&self, id: &str) -> Result<DecisionRecord, GovernanceError> {
        let reader = self.store().reader().await?;
        require_decision(reader.repo(), id).await
    }

    /// Decisions of a project, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the read fails.
    pub async fn get_decisions_by_project(
        &self,
        project_id: &str,
        status_filter: Option<DecisionStatus>,
    ) -> Result<Vec<DecisionRecord>, GovernanceError> {
        let reader = self.store().reader().await?;
        let decisions = reader.list_decisions(project_id, status_filter).await?;
        tracing::debug!(project_id, count = decisions.len(), "listed decisions");
        Ok(decisions)
    }

    /// The full chain containing `id`, oldest first.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the record is missing.
    /// - `Cycle` if the stored pointers revisit a record.
    pub async fn get_supersession_chain(
        &self,
        id: &str,
    ) -> Result<Vec<DecisionRecord>, GovernanceError> {
        let reader = self.store().reader().await?;
        let repo = reader.repo();
        let start = require_decision(repo, id).await?;
        if !start.is_chained() {
            return Ok(vec![start]);
        }
        let project: HashMap<String, DecisionRecord> = repo
            .list_decisions(&start.project_id, None)
            .await?
            .into_iter()
            .map(|d| (d.id.clone(), d))
            .collect();
        walk_chain(&start, &project)
    }
}
