//! Feature-level dependency computation and graph expansion.
//!
//! A [`ScopeGraph`] covers the features of one product version. On
//! construction it resolves, for every feature, the features its own
//! signatures directly invoke, and inverts that relation to get dependents.
//! Graph queries then only walk these precomputed one-hop lists.
//!
//! ## Ordering
//!
//! - `depends_on` follows declaration order of the feature's signatures, then
//!   recorded order of each signature's invocations, first occurrence wins.
//! - `dependants` follows catalog order of the dependent features.
//! - Roots follow catalog order.
//!
//! Identical inputs always give identical orderings.
//!
//! ## Expansion
//!
//! Expansion materializes nodes into a [`GraphArena`]. A node is registered
//! before its children are resolved, and a feature that already has a node
//! is never expanded again, so cycles in the call graph terminate and
//! resolve to shared nodes. Expansion uses an explicit work queue; long call
//! chains do not grow the call stack.

use super::resolver::{ConflictPolicy, SignatureConflict, SignatureIndex};
use super::{FeatureForest, FeatureGraph, GraphArena, NodeId};
use crate::domain::{Feature, FeatureId, InvocationMap, Scope};
use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet, VecDeque};

/// One-hop dependency relations of the features of one product version.
#[derive(Debug)]
pub struct ScopeGraph<'a> {
    scope: Scope,
    index: SignatureIndex<'a>,
    /// Position of each member in the full catalog, for ordering across
    /// scopes
    catalog_positions: Vec<usize>,
    positions: HashMap<&'a FeatureId, usize>,
    dependencies: Vec<Vec<usize>>,
    dependents: Vec<Vec<usize>>,
}

impl<'a> ScopeGraph<'a> {
    /// Compute the relations for the members of `scope` within `catalog`.
    ///
    /// Features of other scopes are ignored, as are repeated copies of an
    /// identity already seen. `invocations` is the ledger of `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousSignatureOwner`] if two features declare the
    /// same signature and `policy` is [`ConflictPolicy::Reject`].
    pub fn new(
        catalog: &'a [Feature],
        scope: &Scope,
        invocations: &InvocationMap,
        policy: ConflictPolicy,
    ) -> Result<Self> {
        let mut members = Vec::new();
        let mut catalog_positions = Vec::new();
        let mut positions = HashMap::new();

        for (catalog_position, feature) in catalog.iter().enumerate() {
            if !feature.id.in_scope(&scope.product, &scope.version) {
                continue;
            }
            // Stores report duplicates once at load time
            if positions.contains_key(&feature.id) {
                tracing::debug!(feature = %feature.id, "Ignoring repeated feature identity");
                continue;
            }
            positions.insert(&feature.id, members.len());
            members.push(feature);
            catalog_positions.push(catalog_position);
        }

        let index = SignatureIndex::build(members, policy)?;
        let dependencies: Vec<Vec<usize>> = (0..index.features().len())
            .map(|position| resolve_dependencies(&index, invocations, position))
            .collect();
        let dependents = invert(&dependencies);

        tracing::debug!(
            scope = %scope,
            features = index.features().len(),
            signatures = index.len(),
            ledger_entries = invocations.len(),
            edges = dependencies.iter().map(Vec::len).sum::<usize>(),
            "Computed feature dependencies"
        );

        Ok(Self {
            scope: scope.clone(),
            index,
            catalog_positions,
            positions,
            dependencies,
            dependents,
        })
    }

    /// The product version this graph covers.
    #[must_use]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Member features in catalog order.
    #[must_use]
    pub fn features(&self) -> &[&'a Feature] {
        self.index.features()
    }

    /// Signatures declared by more than one member feature.
    #[must_use]
    pub fn conflicts(&self) -> &[SignatureConflict] {
        self.index.conflicts()
    }

    /// The signature index the relations were resolved with.
    #[must_use]
    pub fn signatures(&self) -> &SignatureIndex<'a> {
        &self.index
    }

    /// The first member (in catalog order) titled `title`.
    #[must_use]
    pub fn find_by_title(&self, title: &str) -> Option<&'a Feature> {
        self.features()
            .iter()
            .copied()
            .find(|f| f.id.title == title)
    }

    /// Features whose signatures `feature`'s own signatures directly invoke.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FeatureNotFound`] if `feature` is not a member.
    pub fn direct_dependencies(&self, feature: &FeatureId) -> Result<Vec<&'a Feature>> {
        let position = self.position(feature)?;
        Ok(self.members(&self.dependencies[position]))
    }

    /// Features whose own signatures directly invoke `feature`'s signatures.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FeatureNotFound`] if `feature` is not a member.
    pub fn direct_dependents(&self, feature: &FeatureId) -> Result<Vec<&'a Feature>> {
        let position = self.position(feature)?;
        Ok(self.members(&self.dependents[position]))
    }

    /// Features that nothing in this scope depends on, in catalog order.
    pub fn roots(&self) -> impl Iterator<Item = &'a Feature> + '_ {
        self.root_positions().map(|p| self.index.features()[p])
    }

    /// Expand the graph around `feature`, in both directions, whether or
    /// not it is a root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FeatureNotFound`] if `feature` is not a member.
    pub fn feature_graph(&self, feature: &FeatureId) -> Result<FeatureGraph> {
        let position = self.position(feature)?;
        let mut arena = GraphArena::default();
        let root = self.expand(&mut arena, position);
        tracing::debug!(feature = %feature, nodes = arena.len(), "Built feature graph");
        Ok(FeatureGraph::new(arena, root))
    }

    /// Graphs of every root of this scope, sharing one arena.
    #[must_use]
    pub fn top_level_graphs(&self) -> FeatureForest {
        top_level_graphs(std::slice::from_ref(self))
    }

    pub(crate) fn dependency_positions(&self, position: usize) -> &[usize] {
        &self.dependencies[position]
    }

    fn root_positions(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.dependents.len()).filter(|&p| self.dependents[p].is_empty())
    }

    fn position(&self, feature: &FeatureId) -> Result<usize> {
        self.positions
            .get(feature)
            .copied()
            .ok_or_else(|| Error::FeatureNotFound {
                product: feature.product.clone(),
                title: feature.title.clone(),
                version: feature.version.clone(),
            })
    }

    fn members(&self, positions: &[usize]) -> Vec<&'a Feature> {
        positions
            .iter()
            .map(|&p| self.index.features()[p])
            .collect()
    }

    /// Materialize the node for the member at `start`, and every node
    /// reachable from it, into `arena`.
    ///
    /// Returns the existing node untouched if `start` was already
    /// materialized.
    pub(crate) fn expand(&self, arena: &mut GraphArena, start: usize) -> NodeId {
        let (root, created) = arena.get_or_insert(&self.index.features()[start].id);
        if !created {
            return root;
        }

        let mut pending = VecDeque::from([(start, root)]);
        while let Some((position, node)) = pending.pop_front() {
            let mut depends_on = Vec::with_capacity(self.dependencies[position].len());
            for &child in &self.dependencies[position] {
                depends_on.push(self.materialize(arena, child, &mut pending));
            }
            let mut dependants = Vec::with_capacity(self.dependents[position].len());
            for &child in &self.dependents[position] {
                dependants.push(self.materialize(arena, child, &mut pending));
            }
            arena.set_children(node, depends_on, dependants);
        }
        root
    }

    fn materialize(
        &self,
        arena: &mut GraphArena,
        position: usize,
        pending: &mut VecDeque<(usize, NodeId)>,
    ) -> NodeId {
        let (node, created) = arena.get_or_insert(&self.index.features()[position].id);
        if created {
            pending.push_back((position, node));
        }
        node
    }
}

/// Graphs of every root across `scopes`, in catalog order, sharing one
/// arena.
///
/// A root reached while expanding an earlier root is not expanded again;
/// its existing node is listed.
#[must_use]
pub fn top_level_graphs(scopes: &[ScopeGraph<'_>]) -> FeatureForest {
    let mut roots: Vec<(usize, &ScopeGraph<'_>, usize)> = scopes
        .iter()
        .flat_map(|graph| {
            graph
                .root_positions()
                .map(move |p| (graph.catalog_positions[p], graph, p))
        })
        .collect();
    roots.sort_by_key(|&(catalog_position, _, _)| catalog_position);

    let mut arena = GraphArena::default();
    let root_nodes: Vec<NodeId> = roots
        .into_iter()
        .map(|(_, graph, position)| graph.expand(&mut arena, position))
        .collect();

    tracing::debug!(
        scopes = scopes.len(),
        roots = root_nodes.len(),
        nodes = arena.len(),
        "Built top-level feature graphs"
    );
    FeatureForest::new(arena, root_nodes)
}

/// Member positions directly invoked by the member at `position`, first
/// occurrence first, excluding the member itself.
fn resolve_dependencies(
    index: &SignatureIndex<'_>,
    invocations: &InvocationMap,
    position: usize,
) -> Vec<usize> {
    let feature = index.features()[position];
    let mut seen = HashSet::new();
    let mut dependencies = Vec::new();

    for signature in &feature.direct_invocation_signatures {
        let Some(invoked) = invocations.get(signature) else {
            continue;
        };
        for target in invoked {
            match index.owner_position(target) {
                Some(owner) if owner != position => {
                    if seen.insert(owner) {
                        dependencies.push(owner);
                    }
                }
                Some(_) => {}
                None => {
                    tracing::trace!(
                        feature = %feature.id,
                        signature = %target,
                        "Invoked signature belongs to no feature"
                    );
                }
            }
        }
    }

    dependencies
}

/// `dependents[b]` lists every `a` with `b` in `dependencies[a]`, in
/// ascending `a`.
fn invert(dependencies: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut dependents = vec![Vec::new(); dependencies.len()];
    for (dependent, targets) in dependencies.iter().enumerate() {
        for &target in targets {
            dependents[target].push(dependent);
        }
    }
    dependents
}
