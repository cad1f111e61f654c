//! Mutual dependency detection.
//!
//! Cycles are legal in the feature graph and expansion handles them, but a
//! group of features that all depend on each other usually points at a
//! missing abstraction. This module reports such groups as the strongly
//! connected components of the dependency relation.

use super::builder::ScopeGraph;
use crate::domain::FeatureId;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

/// Features that all transitively depend on each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureCycle {
    /// Members in catalog order; always at least two
    pub members: Vec<FeatureId>,
}

impl FeatureCycle {
    /// Titles of the members, in catalog order.
    #[must_use]
    pub fn titles(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.title.as_str()).collect()
    }
}

/// Find every group of two or more mutually dependent features in `graph`.
///
/// Groups are ordered by the catalog position of their first member.
/// Self-dependencies never occur, so single features are never reported.
#[must_use]
pub fn find_cycles(graph: &ScopeGraph<'_>) -> Vec<FeatureCycle> {
    let features = graph.features();

    // Edges point from dependent -> dependency. Node indices equal member
    // positions because nodes are added in member order.
    let mut digraph: DiGraph<usize, ()> = DiGraph::with_capacity(features.len(), 0);
    for position in 0..features.len() {
        digraph.add_node(position);
    }
    for position in 0..features.len() {
        for &target in graph.dependency_positions(position) {
            digraph.add_edge(NodeIndex::new(position), NodeIndex::new(target), ());
        }
    }

    let mut components: Vec<Vec<usize>> = algo::tarjan_scc(&digraph)
        .into_iter()
        .filter(|component| component.len() > 1)
        .map(|component| {
            let mut positions: Vec<usize> = component.iter().map(|&n| digraph[n]).collect();
            positions.sort_unstable();
            positions
        })
        .collect();
    components.sort_unstable_by_key(|positions| positions[0]);

    tracing::debug!(
        scope = %graph.scope(),
        cycles = components.len(),
        "Searched for dependency cycles"
    );

    components
        .into_iter()
        .map(|positions| FeatureCycle {
            members: positions
                .into_iter()
                .map(|p| features[p].id.clone())
                .collect(),
        })
        .collect()
}
