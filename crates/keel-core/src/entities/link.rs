use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Association between a component and a decision. The pair is unique.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ComponentDecisionLink {
    pub component_id: String,
    pub decision_id: String,
    /// `true` when the link was derived rather than requested by a user.
    pub inferred: bool,
    pub linked_at: DateTime<Utc>,
}
