use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ComponentKind;

/// A node in a project's architecture map.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Component {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub kind: ComponentKind,
    pub created_at: DateTime<Utc>,
}
