//! Derived risk metrics.
//!
//! These are never persisted. They are recomputed from store state on every
//! risk query and owned by the caller for the lifetime of one request.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Severity, SignalKind};

/// One signal's contribution to a component's risk score.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RiskFactor {
    pub signal: SignalKind,
    /// Unnormalized value (decayed commit count, superseded ratio, thread count).
    pub raw_value: f64,
    /// Value clamped into `[0, 1]` with the configured fixed scale.
    pub normalized_value: f64,
    pub weight: f64,
    /// `weight * normalized_value`.
    pub contribution: f64,
}

/// Risk assessment for a single component.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ComponentRiskMetrics {
    pub component_id: String,
    /// Integer score in `0..=100`.
    pub risk_score: u8,
    pub overall_severity: Severity,
    /// Sorted by contribution descending, then signal name ascending.
    pub risk_factors: Vec<RiskFactor>,
}
