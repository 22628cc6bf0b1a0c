//! Decision volatility: share of a component's linked decisions that were superseded.

use std::collections::BTreeMap;

use keel_core::enums::DecisionStatus;
use keel_db::repos::link::LinkedDecision;

use super::{SignalMap, SignalValue};

/// Superseded-to-total ratio of linked decisions per component.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn collect(links: &[LinkedDecision]) -> SignalMap {
    let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for link in links {
        let (superseded, total) = counts.entry(link.component_id.as_str()).or_default();
        *total += 1;
        if link.status == DecisionStatus::Superseded {
            *superseded += 1;
        }
    }

    counts
        .into_iter()
        .map(|(component_id, (superseded, total))| {
            let ratio = if total == 0 {
                0.0
            } else {
                superseded as f64 / total as f64
            };
            (
                component_id.to_string(),
                SignalValue {
                    raw: ratio,
                    normalized: ratio,
                },
            )
        })
        .collect()
}
