//! Signal collectors.
//!
//! Each collector is a pure function over a [`RiskSnapshot`] that yields one
//! [`SignalValue`] per component it has evidence for. Components absent from a
//! collector's map contribute zero for that signal.

pub mod commit;
pub mod discussion;
pub mod volatility;

use std::collections::BTreeMap;

use keel_core::entities::{CommitTag, Component, DiscussionThread};
use keel_db::Repo;
use keel_db::error::DatabaseError;
use keel_db::repos::link::LinkedDecision;

/// One component's reading for a single signal.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SignalValue {
    pub raw: f64,
    /// `raw` mapped into `[0, 1]`.
    pub normalized: f64,
}

impl SignalValue {
    /// Normalize `raw` against a fixed saturation scale.
    #[must_use]
    pub fn scaled(raw: f64, scale: f64) -> Self {
        Self {
            raw,
            normalized: (raw / scale).clamp(0.0, 1.0),
        }
    }
}

/// Signal readings keyed by component id.
pub type SignalMap = BTreeMap<String, SignalValue>;

/// Everything the collectors read for one project, taken in one pass.
#[derive(Debug, Clone, Default)]
pub struct RiskSnapshot {
    pub components: Vec<Component>,
    pub commits: Vec<CommitTag>,
    pub links: Vec<LinkedDecision>,
    pub open_discussions: Vec<DiscussionThread>,
}

impl RiskSnapshot {
    /// Read the project's components and signal inputs concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first `DatabaseError` from any of the reads.
    pub async fn load(repo: Repo<'_>, project_id: &str) -> Result<Self, DatabaseError> {
        let (components, commits, links, open_discussions) = tokio::try_join!(
            repo.list_components(project_id),
            repo.commit_tags_for_project(project_id),
            repo.linked_decisions_for_project(project_id),
            repo.open_discussions_for_project(project_id),
        )?;
        tracing::debug!(
            project_id,
            components = components.len(),
            commits = commits.len(),
            links = links.len(),
            discussions = open_discussions.len(),
            "loaded risk snapshot"
        );
        Ok(Self {
            components,
            commits,
            links,
            open_discussions,
        })
    }
}
