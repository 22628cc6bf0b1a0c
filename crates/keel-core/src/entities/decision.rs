use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::DecisionStatus;

/// An architectural decision record.
///
/// Content (`context`, `decision`, `rationale`, `consequences`) is frozen once the
/// record is superseded. `superseded_by` is set exactly when `status` is
/// [`DecisionStatus::Superseded`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DecisionRecord {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub context: String,
    pub decision: String,
    pub rationale: String,
    pub consequences: String,
    pub status: DecisionStatus,
    pub supersedes: Option<String>,
    pub superseded_by: Option<String>,
    pub tags: BTreeSet<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DecisionRecord {
    /// Whether either supersession pointer is set.
    #[must_use]
    pub const fn is_chained(&self) -> bool {
        self.supersedes.is_some() || self.superseded_by.is_some()
    }
}
