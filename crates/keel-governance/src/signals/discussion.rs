//! Discussion volume: open threads on a component or on decisions linked to it.

use std::collections::{BTreeMap, BTreeSet};

use keel_core::entities::DiscussionThread;
use keel_core::enums::{AnchorType, DiscussionStatus};
use keel_db::repos::link::LinkedDecision;

use super::{SignalMap, SignalValue};

/// Distinct open threads per component, normalized by `scale`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn collect(threads: &[DiscussionThread], links: &[LinkedDecision], scale: f64) -> SignalMap {
    let mut components_by_decision: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for link in links {
        components_by_decision
            .entry(link.decision_id.as_str())
            .or_default()
            .push(link.component_id.as_str());
    }

    let mut open: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for thread in threads.iter().filter(|t| t.status == DiscussionStatus::Open) {
        match thread.anchor_type {
            AnchorType::Component => {
                open.entry(thread.anchor_id.as_str())
                    .or_default()
                    .insert(thread.id.as_str());
            }
            AnchorType::Decision => {
                for component_id in components_by_decision
                    .get(thread.anchor_id.as_str())
                    .into_iter()
                    .flatten()
                {
                    open.entry(*component_id).or_default().insert(thread.id.as_str());
                }
            }
        }
    }

    open.into_iter()
        .map(|(component_id, ids)| {
            (
                component_id.to_string(),
                SignalValue::scaled(ids.len() as f64, scale),
            )
        })
        .collect()
}
