use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A commit tagged to a component.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CommitTag {
    pub component_id: String,
    pub commit_sha: String,
    pub committed_at: DateTime<Utc>,
}
