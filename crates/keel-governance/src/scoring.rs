//! Weighted risk scoring and severity tiers.

use keel_config::RiskConfig;
use keel_core::enums::{Severity, SignalKind};
use keel_core::metrics::{ComponentRiskMetrics, RiskFactor};

use crate::signals::{RiskSnapshot, SignalMap, SignalValue, commit, discussion, volatility};

const TIERS: [Severity; 4] = [
    Severity::Low,
    Severity::Medium,
    Severity::High,
    Severity::Critical,
];

/// Map a score to its tier. `thresholds` are the inclusive lower bounds of
/// medium, high and critical.
#[must_use]
pub fn severity_for(score: u8, thresholds: &[u8]) -> Severity {
    let crossed = thresholds.iter().filter(|t| score >= **t).count();
    TIERS.get(crossed).copied().unwrap_or(Severity::Critical)
}

fn weight_of(signal: SignalKind, config: &RiskConfig) -> f64 {
    match signal {
        SignalKind::CommitChurn => config.commit_weight,
        SignalKind::DecisionVolatility => config.volatility_weight,
        SignalKind::DiscussionVolume => config.discussion_weight,
    }
}

/// Combine one component's signal readings into its metrics.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn score_component(
    component_id: &str,
    readings: [(SignalKind, SignalValue); 3],
    config: &RiskConfig,
) -> ComponentRiskMetrics {
    let mut risk_factors: Vec<RiskFactor> = readings
        .into_iter()
        .map(|(signal, value)| {
            let weight = weight_of(signal, config);
            RiskFactor {
                signal,
                raw_value: value.raw,
                normalized_value: value.normalized,
                weight,
                contribution: weight * value.normalized,
            }
        })
        .collect();
    risk_factors.sort_by(|a, b| {
        b.contribution
            .total_cmp(&a.contribution)
            .then_with(|| a.signal.as_str().cmp(b.signal.as_str()))
    });

    let total: f64 = risk_factors.iter().map(|f| f.contribution).sum();
    let risk_score = (100.0 * total).round().clamp(0.0, 100.0) as u8;

    ComponentRiskMetrics {
        component_id: component_id.to_string(),
        risk_score,
        overall_severity: severity_for(risk_score, &config.thresholds),
        risk_factors,
    }
}

/// Collector outputs for a whole project.
#[derive(Debug, Clone, Default)]
pub struct ProjectSignals {
    pub commit_churn: SignalMap,
    pub decision_volatility: SignalMap,
    pub discussion_volume: SignalMap,
}

impl ProjectSignals {
    /// Run every collector over the snapshot.
    #[must_use]
    pub fn collect(
        snapshot: &RiskSnapshot,
        as_of: chrono::DateTime<chrono::Utc>,
        config: &RiskConfig,
    ) -> Self {
        Self {
            commit_churn: commit::collect(
                &snapshot.commits,
                as_of,
                config.commit_window_days,
                config.commit_scale,
            ),
            decision_volatility: volatility::collect(&snapshot.links),
            discussion_volume: discussion::collect(
                &snapshot.open_discussions,
                &snapshot.links,
                config.discussion_scale,
            ),
        }
    }

    /// This component's readings, zero where a collector saw nothing.
    #[must_use]
    pub fn readings(&self, component_id: &str) -> [(SignalKind, SignalValue); 3] {
        let get = |map: &SignalMap| map.get(component_id).copied().unwrap_or_default();
        [
            (SignalKind::CommitChurn, get(&self.commit_churn)),
            (SignalKind::DecisionVolatility, get(&self.decision_volatility)),
            (SignalKind::DiscussionVolume, get(&self.discussion_volume)),
        ]
    }
}

/// Score every component of the snapshot, ordered by component id.
#[must_use]
pub fn score_project(
    snapshot: &RiskSnapshot,
    as_of: chrono::DateTime<chrono::Utc>,
    config: &RiskConfig,
) -> Vec<ComponentRiskMetrics> {
    let signals = ProjectSignals::collect(snapshot, as_of, config);
    let mut metrics: Vec<ComponentRiskMetrics> = snapshot
        .components
        .iter()
        .map(|c| score_component(&c.id, signals.readings(&c.id), config))
        .collect();
    metrics.sort_by(|a, b| a.component_id.cmp(&b.component_id));
    metrics
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn readings(commit: f64, volatility: f64, discussion: f64) -> [(SignalKind, SignalValue); 3] {
        let value = |n: f64| SignalValue {
            raw: n,
            normalized: n,
        };
        [
            (SignalKind::CommitChurn, value(commit)),
            (SignalKind::DecisionVolatility, value(volatility)),
            (SignalKind::DiscussionVolume, value(discussion)),
        ]
    }

    #[rstest]
    #[case(0, Severity::Low)]
    #[case(24, Severity::Low)]
    #[case(25, Severity::Medium)]
    #[case(49, Severity::Medium)]
    #[case(50, Severity::High)]
    #[case(74, Severity::High)]
    #[case(75, Severity::Critical)]
    #[case(100, Severity::Critical)]
    fn default_tiers(#[case] score: u8, #[case] expected: Severity) {
        assert_eq!(severity_for(score, &[25, 50, 75]), expected);
    }

    #[test]
    fn all_zero_is_low() {
        let metrics = score_component("cmp-1", readings(0.0, 0.0, 0.0), &RiskConfig::default());
        assert_eq!(metrics.risk_score, 0);
        assert_eq!(metrics.overall_severity, Severity::Low);
    }

    #[test]
    fn all_saturated_is_critical() {
        let metrics = score_component("cmp-1", readings(1.0, 1.0, 1.0), &RiskConfig::default());
        assert_eq!(metrics.risk_score, 100);
        assert_eq!(metrics.overall_severity, Severity::Critical);
    }

    #[test]
    fn weighted_sum_rounds() {
        // 0.4*0.5 + 0.35*0.5 + 0.25*0.3 = 0.45
        let metrics = score_component("cmp-1", readings(0.5, 0.5, 0.3), &RiskConfig::default());
        assert_eq!(metrics.risk_score, 45);
        assert_eq!(metrics.overall_severity, Severity::Medium);
    }

    #[test]
    fn factors_sorted_by_contribution_then_name() {
        let config = RiskConfig {
            commit_weight: 0.5,
            volatility_weight: 0.25,
            discussion_weight: 0.25,
            ..RiskConfig::default()
        };
        let metrics = score_component("cmp-1", readings(0.0, 0.4, 0.4), &config);
        let order: Vec<SignalKind> = metrics.risk_factors.iter().map(|f| f.signal).collect();
        assert_eq!(
            order,
            vec![
                SignalKind::DecisionVolatility,
                SignalKind::DiscussionVolume,
                SignalKind::CommitChurn,
            ]
        );
        assert!((metrics.risk_factors[0].contribution - 0.1).abs() < 1e-9);
    }

    #[test]
    fn score_is_monotonic_in_each_signal() {
        let config = RiskConfig::default();
        let steps = [0.0, 0.1, 0.25, 0.5, 0.75, 1.0];
        for index in 0..3 {
            let mut previous = 0;
            for step in steps {
                let mut values = [0.3, 0.3, 0.3];
                values[index] = step;
                let score =
                    score_component("c", readings(values[0], values[1], values[2]), &config).risk_score;
                assert!(score >= previous, "signal {index} at {step}: {score} < {previous}");
                previous = score;
            }
        }
    }

    #[test]
    fn synthetic_weights_change_the_score() {
        let commit_only = RiskConfig {
            commit_weight: 1.0,
            volatility_weight: 0.0,
            discussion_weight: 0.0,
            ..RiskConfig::default()
        };
        let metrics = score_component("cmp-1", readings(0.6, 1.0, 1.0), &commit_only);
        assert_eq!(metrics.risk_score, 60);
        assert_eq!(metrics.overall_severity, Severity::High);
    }
}
