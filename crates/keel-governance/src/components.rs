//! Store-feeding operations: components, commit tags, discussion threads.

use chrono::{DateTime, Utc};
use keel_core::audit_detail::StatusChangedDetail;
use keel_core::entities::{CommitTag, Component, DiscussionThread};
use keel_core::enums::{AnchorType, AuditAction, ComponentKind, DiscussionStatus, EntityType};
use keel_core::ids::{PREFIX_COMPONENT, PREFIX_DISCUSSION};
use keel_db::Repo;

use crate::decisions::require_decision;
use crate::error::GovernanceError;
use crate::{Governance, require_non_blank, to_detail};

pub(crate) async fn require_component(
    repo: Repo<'_>,
    id: &str,
) -> Result<Component, GovernanceError> {
    repo.find_component(id)
        .await?
        .ok_or_else(|| GovernanceError::not_found(EntityType::Component, id))
}

impl Governance {
    /// # Errors
    ///
    /// Returns `Validation` if `project_id` or `name` is blank.
    pub async fn register_component(
        &self,
        project_id: &str,
        name: &str,
        kind: ComponentKind,
    ) -> Result<Component, GovernanceError> {
        require_non_blank("project_id", project_id)?;
        require_non_blank("name", name)?;

        let tx = self.store().begin_write().await?;
        let result = Self::register_in(tx.repo(), project_id, name, kind).await;
        tx.finish(result).await
    }

    async fn register_in(
        repo: Repo<'_>,
        project_id: &str,
        name: &str,
        kind: ComponentKind,
    ) -> Result<Component, GovernanceError> {
        let now = Utc::now();
        let component = Component {
            id: repo.generate_id(PREFIX_COMPONENT).await?,
            project_id: project_id.to_string(),
            name: name.trim().to_string(),
            kind,
            created_at: now,
        };
        repo.insert_component(&component).await?;
        repo.record_audit(
            EntityType::Component,
            &component.id,
            AuditAction::Created,
            None,
            now,
        )
        .await?;
        tracing::debug!(id = %component.id, project_id, "registered component");
        Ok(component)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the component is missing.
    pub async fn get_component(&self, id: &str) -> Result<Component, GovernanceError> {
        let reader = self.store().reader().await?;
        require_component(reader.repo(), id).await
    }

    /// Components of a project ordered by id.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the read fails.
    pub async fn list_components(&self, project_id: &str) -> Result<Vec<Component>, GovernanceError> {
        let reader = self.store().reader().await?;
        Ok(reader.list_components(project_id).await?)
    }

    /// Delete a component with its links, commit tags and anchored discussions.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the component is missing.
    pub async fn delete_component(&self, id: &str) -> Result<(), GovernanceError> {
        let tx = self.store().begin_write().await?;
        let result = Self::delete_component_in(tx.repo(), id).await;
        tx.finish(result).await
    }

    async fn delete_component_in(repo: Repo<'_>, id: &str) -> Result<(), GovernanceError> {
        require_component(repo, id).await?;
        let links = repo.delete_links_for_component(id).await?;
        let commits = repo.delete_commit_tags_for_component(id).await?;
        let threads = repo
            .delete_discussions_for_anchor(AnchorType::Component, id)
            .await?;
        repo.delete_component(id).await?;
        repo.record_audit(EntityType::Component, id, AuditAction::Deleted, None, Utc::now())
            .await?;
        tracing::debug!(id, links, commits, threads, "deleted component");
        Ok(())
    }

    /// Tag a commit to a component. Returns `false` if it was already tagged.
    ///
    /// # Errors
    ///
    /// - `Validation` if `commit_sha` is blank.
    /// - `NotFound` if the component is missing.
    pub async fn tag_commit(
        &self,
        component_id: &str,
        commit_sha: &str,
        committed_at: DateTime<Utc>,
    ) -> Result<bool, GovernanceError> {
        require_non_blank("commit_sha", commit_sha)?;
        let tag = CommitTag {
            component_id: component_id.to_string(),
            commit_sha: commit_sha.trim().to_string(),
            committed_at,
        };
        let tx = self.store().begin_write().await?;
        let result = Self::tag_commit_in(tx.repo(), &tag).await;
        tx.finish(result).await
    }

    async fn tag_commit_in(repo: Repo<'_>, tag: &CommitTag) -> Result<bool, GovernanceError> {
        require_component(repo, &tag.component_id).await?;
        Ok(repo.insert_commit_tag(tag).await?)
    }

    /// Open a discussion thread on a component or decision of the project.
    ///
    /// # Errors
    ///
    /// - `Validation` if a field is blank or the anchor is in another project.
    /// - `NotFound` if the anchor is missing.
    pub async fn open_discussion(
        &self,
        project_id: &str,
        anchor_type: AnchorType,
        anchor_id: &str,
        title: &str,
    ) -> Result<DiscussionThread, GovernanceError> {
        require_non_blank("project_id", project_id)?;
        require_non_blank("title", title)?;

        let tx = self.store().begin_write().await?;
        let result = Self::open_discussion_in(tx.repo(), project_id, anchor_type, anchor_id, title).await;
        tx.finish(result).await
    }

    async fn open_discussion_in(
        repo: Repo<'_>,
        project_id: &str,
        anchor_type: AnchorType,
        anchor_id: &str,
        title: &str,
    ) -> Result<DiscussionThread, GovernanceError> {
        let anchor_project = match anchor_type {
            AnchorType::Component => require_component(repo, anchor_id).await?.project_id,
            AnchorType::Decision => require_decision(repo, anchor_id).await?.project_id,
        };
        if anchor_project != project_id {
            return Err(GovernanceError::Validation(format!(
                "{anchor_type} '{anchor_id}' belongs to project '{anchor_project}', not '{project_id}'"
            )));
        }

        let now = Utc::now();
        let thread = DiscussionThread {
            id: repo.generate_id(PREFIX_DISCUSSION).await?,
            project_id: project_id.to_string(),
            anchor_type,
            anchor_id: anchor_id.to_string(),
            title: title.trim().to_string(),
            status: DiscussionStatus::Open,
            created_at: now,
        };
        repo.insert_discussion(&thread).await?;
        repo.record_audit(
            EntityType::Discussion,
            &thread.id,
            AuditAction::Created,
            None,
            now,
        )
        .await?;
        Ok(thread)
    }

    /// Resolve a thread. Resolving a resolved thread is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the thread is missing.
    pub async fn resolve_discussion(&self, id: &str) -> Result<DiscussionThread, GovernanceError> {
        let tx = self.store().begin_write().await?;
        let result = Self::resolve_discussion_in(tx.repo(), id).await;
        tx.finish(result).await
    }

    async fn resolve_discussion_in(
        repo: Repo<'_>,
        id: &str,
    ) -> Result<DiscussionThread, GovernanceError> {
        let mut thread = repo
            .find_discussion(id)
            .await?
            .ok_or_else(|| GovernanceError::not_found(EntityType::Discussion, id))?;
        if thread.status == DiscussionStatus::Resolved {
            return Ok(thread);
        }

        repo.set_discussion_status(id, DiscussionStatus::Resolved).await?;
        let detail = StatusChangedDetail {
            from: thread.status.as_str().to_string(),
            to: DiscussionStatus::Resolved.as_str().to_string(),
        };
        repo.record_audit(
            EntityType::Discussion,
            id,
            AuditAction::StatusChanged,
            Some(to_detail(&detail)?),
            Utc::now(),
        )
        .await?;
        thread.status = DiscussionStatus::Resolved;
        Ok(thread)
    }
}
