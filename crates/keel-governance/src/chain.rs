//! Supersession graph and chain traversal.
//!
//! The supersession relation of a project is materialized as a `DiGraph` with
//! one edge `old → new` per supersession. Edge writes are checked against this
//! graph before they reach the store. Chain reads walk the stored pointers
//! directly with a visited set, so a corrupted store still terminates.

use std::collections::{HashMap, HashSet};

use keel_core::entities::DecisionRecord;
use rustworkx_core::petgraph::algo::{astar, toposort};
use rustworkx_core::petgraph::graph::{DiGraph, NodeIndex};

use crate::error::GovernanceError;

/// Directed supersession graph over one project's decisions.
pub struct SupersessionGraph {
    graph: DiGraph<String, ()>,
    id_to_index: HashMap<String, NodeIndex>,
}

impl SupersessionGraph {
    /// Build from a snapshot of decision records.
    ///
    /// Both pointer directions contribute edges, so a half-written edge is still
    /// visible to the cycle check. Pointers to missing records become
    /// dangling nodes.
    #[must_use]
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a DecisionRecord>) -> Self {
        let mut this = Self {
            graph: DiGraph::new(),
            id_to_index: HashMap::new(),
        };
        for record in records {
            let node = this.node(&record.id);
            if let Some(ref new_id) = record.superseded_by {
                let new = this.node(new_id);
                this.graph.update_edge(node, new, ());
            }
            if let Some(ref old_id) = record.supersedes {
                let old = this.node(old_id);
                this.graph.update_edge(old, node, ());
            }
        }
        this
    }

    fn node(&mut self, id: &str) -> NodeIndex {
        if let Some(index) = self.id_to_index.get(id) {
            return *index;
        }
        let index = self.graph.add_node(id.to_string());
        self.id_to_index.insert(id.to_string(), index);
        index
    }

    /// A cycle already present in the stored pointers, as `n → … → n`.
    #[must_use]
    pub fn existing_cycle(&self) -> Option<Vec<String>> {
        let start = toposort(&self.graph, None).err()?.node_id();
        self.graph.neighbors(start).find_map(|next| {
            let (_, path) = astar(&self.graph, next, |n| n == start, |_| 1_u32, |_| 0)?;
            let mut ids = vec![self.graph[start].clone()];
            ids.extend(path.into_iter().map(|n| self.graph[n].clone()));
            Some(ids)
        })
    }

    /// The cycle that adding `old → new` would close, if any.
    ///
    /// Returns the path `new → … → old → new` when `old` is reachable from
    /// `new` along existing edges.
    #[must_use]
    pub fn cycle_through(&self, old_id: &str, new_id: &str) -> Option<Vec<String>> {
        if old_id == new_id {
            return Some(vec![old_id.to_string(), new_id.to_string()]);
        }
        let old = *self.id_to_index.get(old_id)?;
        let new = *self.id_to_index.get(new_id)?;
        let (_, path) = astar(&self.graph, new, |n| n == old, |_| 1_u32, |_| 0)?;
        let mut ids: Vec<String> = path.into_iter().map(|n| self.graph[n].clone()).collect();
        ids.push(new_id.to_string());
        Some(ids)
    }
}

/// Walk the chain containing `start` and return it ordered oldest to newest.
///
/// Follows `supersedes` backward and `superseded_by` forward over `records`.
/// A pointer to a record missing from `records` ends that side of the walk.
///
/// # Errors
///
/// Returns [`GovernanceError::Cycle`] if any record is reached twice.
pub fn walk_chain(
    start: &DecisionRecord,
    records: &HashMap<String, DecisionRecord>,
) -> Result<Vec<DecisionRecord>, GovernanceError> {
    let mut visited: HashSet<&str> = HashSet::from([start.id.as_str()]);
    let mut path: Vec<String> = vec![start.id.clone()];

    let mut older = Vec::new();
    let mut cursor = start;
    while let Some(ref prev_id) = cursor.supersedes {
        let Some(prev) = step(cursor, prev_id, records, &mut visited, &mut path)? else {
            break;
        };
        older.push(prev);
        cursor = prev;
    }

    let mut newer = Vec::new();
    let mut cursor = start;
    while let Some(ref next_id) = cursor.superseded_by {
        let Some(next) = step(cursor, next_id, records, &mut visited, &mut path)? else {
            break;
        };
        newer.push(next);
        cursor = next;
    }

    Ok(older
        .into_iter()
        .rev()
        .chain(std::iter::once(start))
        .chain(newer)
        .cloned()
        .collect())
}

fn step<'r>(
    from: &DecisionRecord,
    to_id: &str,
    records: &'r HashMap<String, DecisionRecord>,
    visited: &mut HashSet<&'r str>,
    path: &mut Vec<String>,
) -> Result<Option<&'r DecisionRecord>, GovernanceError> {
    path.push(to_id.to_string());
    let Some(next) = records.get(to_id) else {
        tracing::warn!(from = %from.id, to = to_id, "dangling supersession pointer");
        return Ok(None);
    };
    if !visited.insert(next.id.as_str()) {
        return Err(GovernanceError::Cycle {
            id: to_id.to_string(),
            path: std::mem::take(path),
        });
    }
    Ok(Some(next))
}
