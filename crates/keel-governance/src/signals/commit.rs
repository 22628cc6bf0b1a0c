//! Commit churn: recency-weighted count of commits tagged to each component.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use keel_core::entities::CommitTag;

use super::{SignalMap, SignalValue};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Linear decay weight for a commit made at `committed_at`.
///
/// `1` for a commit made now or in the future, falling to `0` at `window_days`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn recency_weight(committed_at: DateTime<Utc>, as_of: DateTime<Utc>, window_days: u32) -> f64 {
    let age_days = (as_of - committed_at).num_seconds() as f64 / SECONDS_PER_DAY;
    if age_days <= 0.0 {
        return 1.0;
    }
    (1.0 - age_days / f64::from(window_days)).max(0.0)
}

/// Decayed commit count per component, normalized by `scale`.
#[must_use]
pub fn collect(commits: &[CommitTag], as_of: DateTime<Utc>, window_days: u32, scale: f64) -> SignalMap {
    let mut distinct: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut decayed: BTreeMap<&str, f64> = BTreeMap::new();

    for tag in commits {
        let seen = distinct.entry(tag.component_id.as_str()).or_default();
        if !seen.insert(tag.commit_sha.as_str()) {
            continue;
        }
        *decayed.entry(tag.component_id.as_str()).or_default() +=
            recency_weight(tag.committed_at, as_of, window_days);
    }

    decayed
        .into_iter()
        .map(|(component_id, raw)| (component_id.to_string(), SignalValue::scaled(raw, scale)))
        .collect()
}
