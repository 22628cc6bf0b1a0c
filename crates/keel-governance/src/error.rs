//! Governance error types.

use keel_core::enums::{DecisionStatus, EntityType};
use keel_db::error::DatabaseError;

/// Errors from governance operations.
///
/// Domain errors (`Validation`, `NotFound`, `InvalidState`, `Cycle`) are
/// distinct from store failures so callers can tell a rejected request from an
/// unavailable store.
#[derive(Debug, thiserror::Error)]
pub enum GovernanceError {
    /// Malformed input: blank required field, cross-project reference.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{entity_type} '{id}' not found")]
    NotFound { entity_type: EntityType, id: String },

    /// The entity exists but its current state forbids the operation.
    #[error("{entity_type} '{id}' is {status}: {reason}")]
    InvalidState {
        entity_type: EntityType,
        id: String,
        status: DecisionStatus,
        reason: String,
    },

    /// The supersession relation would contain, or already contains, a cycle.
    #[error("supersession cycle at '{id}': {}", path.join(" -> "))]
    Cycle { id: String, path: Vec<String> },

    #[error("store call '{operation}' timed out after {timeout_ms}ms")]
    StorageTimeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    #[error("store error: {0}")]
    Storage(DatabaseError),
}

impl From<DatabaseError> for GovernanceError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::Timeout {
                operation,
                timeout_ms,
            } => Self::StorageTimeout {
                operation,
                timeout_ms,
            },
            other => Self::Storage(other),
        }
    }
}

impl GovernanceError {
    pub(crate) fn not_found(entity_type: EntityType, id: &str) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    pub(crate) fn invalid_decision(
        id: &str,
        status: DecisionStatus,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidState {
            entity_type: EntityType::Decision,
            id: id.to_string(),
            status,
            reason: reason.into(),
        }
    }
}
