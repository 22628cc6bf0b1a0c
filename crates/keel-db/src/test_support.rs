//! Shared test utilities for keel-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use std::collections::BTreeSet;
    use std::time::Duration;

    use chrono::{DateTime, TimeZone, Utc};
    use keel_core::entities::{Component, DecisionRecord};
    use keel_core::enums::{ComponentKind, DecisionStatus};

    use crate::Store;

    /// Create an in-memory store with a generous deadline.
    pub async fn test_store() -> Store {
        Store::open_local(":memory:", Duration::from_secs(5))
            .await
            .unwrap()
    }

    /// Fixed base instant; tests offset from it in seconds.
    pub fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    /// A proposed decision created `offset_secs` after [`base_time`].
    pub fn decision_at(id: &str, project_id: &str, offset_secs: i64) -> DecisionRecord {
        let at = base_time() + chrono::Duration::seconds(offset_secs);
        DecisionRecord {
            id: id.to_string(),
            project_id: project_id.to_string(),
            title: format!("Decision {id}"),
            context: "Context".to_string(),
            decision: "Decision".to_string(),
            rationale: "Rationale".to_string(),
            consequences: "Consequences".to_string(),
            status: DecisionStatus::Proposed,
            supersedes: None,
            superseded_by: None,
            tags: BTreeSet::new(),
            created_by: "tester".to_string(),
            created_at: at,
            updated_at: at,
        }
    }

    pub fn component(id: &str, project_id: &str) -> Component {
        Component {
            id: id.to_string(),
            project_id: project_id.to_string(),
            name: format!("component {id}"),
            kind: ComponentKind::Service,
            created_at: base_time(),
        }
    }
}
