//! Risk scoring configuration.
//!
//! Weights and thresholds are injected rather than hard-coded so the aggregator
//! can be exercised against synthetic weight sets. Scales are fixed constants,
//! never derived from the data, which keeps scores comparable across projects.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const fn default_commit_weight() -> f64 {
    0.4
}

const fn default_volatility_weight() -> f64 {
    0.35
}

const fn default_discussion_weight() -> f64 {
    0.25
}

fn default_thresholds() -> Vec<u8> {
    vec![25, 50, 75]
}

const fn default_commit_window_days() -> u32 {
    90
}

const fn default_commit_scale() -> f64 {
    10.0
}

const fn default_discussion_scale() -> f64 {
    10.0
}

/// Tolerance for the weights-sum-to-one check.
const WEIGHT_SUM_TOLERANCE: f64 = 0.001;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RiskConfig {
    /// Weight of the commit-churn signal.
    #[serde(default = "default_commit_weight")]
    pub commit_weight: f64,

    /// Weight of the decision-volatility signal.
    #[serde(default = "default_volatility_weight")]
    pub volatility_weight: f64,

    /// Weight of the discussion-volume signal.
    #[serde(default = "default_discussion_weight")]
    pub discussion_weight: f64,

    /// Lower bounds of the medium, high and critical tiers.
    #[serde(default = "default_thresholds")]
    pub thresholds: Vec<u8>,

    /// Commits older than this many days no longer contribute to churn.
    #[serde(default = "default_commit_window_days")]
    pub commit_window_days: u32,

    /// Decayed commit count that saturates the churn signal.
    #[serde(default = "default_commit_scale")]
    pub commit_scale: f64,

    /// Open thread count that saturates the discussion signal.
    #[serde(default = "default_discussion_scale")]
    pub discussion_scale: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            commit_weight: default_commit_weight(),
            volatility_weight: default_volatility_weight(),
            discussion_weight: default_discussion_weight(),
            thresholds: default_thresholds(),
            commit_window_days: default_commit_window_days(),
            commit_scale: default_commit_scale(),
            discussion_scale: default_discussion_scale(),
        }
    }
}

impl RiskConfig {
    /// Check weights, thresholds and scales.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, weight) in [
            ("risk.commit_weight", self.commit_weight),
            ("risk.volatility_weight", self.volatility_weight),
            ("risk.discussion_weight", self.discussion_weight),
        ] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(ConfigError::invalid(
                    field,
                    format!("weight must be between 0.0 and 1.0, got {weight}"),
                ));
            }
        }

        let sum = self.commit_weight + self.volatility_weight + self.discussion_weight;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::invalid(
                "risk.weights",
                format!("weights must sum to 1.0, got {sum:.3}"),
            ));
        }

        if self.thresholds.len() != 3 {
            return Err(ConfigError::invalid(
                "risk.thresholds",
                format!(
                    "expected 3 thresholds (medium, high, critical), got {}",
                    self.thresholds.len()
                ),
            ));
        }
        if self.thresholds.iter().any(|t| *t == 0 || *t > 100) {
            return Err(ConfigError::invalid(
                "risk.thresholds",
                "thresholds must be within 1..=100",
            ));
        }
        if !self.thresholds.windows(2).all(|pair| pair[0] < pair[1]) {
            return Err(ConfigError::invalid(
                "risk.thresholds",
                "thresholds must be strictly ascending",
            ));
        }

        if self.commit_window_days == 0 {
            return Err(ConfigError::invalid(
                "risk.commit_window_days",
                "window must be at least one day",
            ));
        }
        for (field, scale) in [
            ("risk.commit_scale", self.commit_scale),
            ("risk.discussion_scale", self.discussion_scale),
        ] {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(ConfigError::invalid(
                    field,
                    format!("scale must be positive, got {scale}"),
                ));
            }
        }

        Ok(())
    }
}
