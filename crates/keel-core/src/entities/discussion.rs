use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{AnchorType, DiscussionStatus};

/// A discussion thread anchored to a component or a decision.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DiscussionThread {
    pub id: String,
    pub project_id: String,
    pub anchor_type: AnchorType,
    pub anchor_id: String,
    pub title: String,
    pub status: DiscussionStatus,
    pub created_at: DateTime<Utc>,
}
