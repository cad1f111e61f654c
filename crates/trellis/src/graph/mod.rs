//! Feature dependency graphs.
//!
//! This module turns a signature-level call graph into a feature-level one:
//!
//! - [`resolver`]: signature -> owning feature, per product version
//! - [`builder`]: direct dependencies and dependents, and cycle-safe graph
//!   expansion
//! - [`cycles`]: strongly connected groups of mutually dependent features
//!
//! ## Representation
//!
//! The call graph may be cyclic, so results are not trees of owned nodes.
//! Every query materializes nodes into a [`GraphArena`], keyed by
//! [`FeatureId`]. A node's `depends_on` and `dependants` lists hold
//! [`NodeId`]s into that arena. A feature reached along several paths, or
//! around a cycle, is one node referenced from several places; it is
//! expanded once, when first materialized.
//!
//! Walk results with [`NodeRef`], a borrowed view that follows child ids
//! back into the arena.

pub mod builder;
pub mod cycles;
pub mod resolver;

pub use builder::{ScopeGraph, top_level_graphs};
pub use cycles::{FeatureCycle, find_cycles};
pub use resolver::{ConflictPolicy, SignatureConflict, SignatureIndex};

use crate::domain::FeatureId;
use std::collections::HashMap;

/// Index of a node within its [`GraphArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena, in materialization order.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A materialized feature node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureNode {
    feature: FeatureId,
    depends_on: Vec<NodeId>,
    dependants: Vec<NodeId>,
}

/// Per-query node cache: one node per feature identity.
#[derive(Debug, Clone, Default)]
pub struct GraphArena {
    nodes: Vec<FeatureNode>,
    index: HashMap<FeatureId, NodeId>,
}

impl GraphArena {
    /// Number of materialized nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node has been materialized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// View of a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this arena.
    #[must_use]
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        assert!(id.0 < self.nodes.len(), "node id from a different arena");
        NodeRef { arena: self, id }
    }

    /// The node materialized for `feature`, if any.
    #[must_use]
    pub fn find(&self, feature: &FeatureId) -> Option<NodeRef<'_>> {
        self.index.get(feature).map(|&id| NodeRef { arena: self, id })
    }

    /// All nodes in materialization order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        (0..self.nodes.len()).map(move |i| NodeRef {
            arena: self,
            id: NodeId(i),
        })
    }

    /// Returns the node for `feature` and whether it was created by this
    /// call. New nodes start with no children.
    pub(crate) fn get_or_insert(&mut self, feature: &FeatureId) -> (NodeId, bool) {
        if let Some(&id) = self.index.get(feature) {
            return (id, false);
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(FeatureNode {
            feature: feature.clone(),
            depends_on: Vec::new(),
            dependants: Vec::new(),
        });
        self.index.insert(feature.clone(), id);
        (id, true)
    }

    pub(crate) fn set_children(
        &mut self,
        id: NodeId,
        depends_on: Vec<NodeId>,
        dependants: Vec<NodeId>,
    ) {
        let node = &mut self.nodes[id.0];
        node.depends_on = depends_on;
        node.dependants = dependants;
    }
}

/// Borrowed view of one node in a [`GraphArena`].
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    arena: &'a GraphArena,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    /// Arena id of this node.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Identity of the feature this node stands for.
    #[must_use]
    pub fn feature(&self) -> &'a FeatureId {
        &self.raw().feature
    }

    /// Features whose code this feature directly invokes, in resolution
    /// order.
    pub fn depends_on(self) -> impl ExactSizeIterator<Item = NodeRef<'a>> + 'a {
        let arena = self.arena;
        self.raw()
            .depends_on
            .iter()
            .map(move |&id| NodeRef { arena, id })
    }

    /// Features that directly invoke this feature's code, in catalog order.
    pub fn dependants(self) -> impl ExactSizeIterator<Item = NodeRef<'a>> + 'a {
        let arena = self.arena;
        self.raw()
            .dependants
            .iter()
            .map(move |&id| NodeRef { arena, id })
    }

    /// Titles of `depends_on`, mainly for assertions and summaries.
    #[must_use]
    pub fn depends_on_titles(&self) -> Vec<&'a str> {
        self.depends_on().map(|n| n.feature().title.as_str()).collect()
    }

    /// Titles of `dependants`, mainly for assertions and summaries.
    #[must_use]
    pub fn dependant_titles(&self) -> Vec<&'a str> {
        self.dependants().map(|n| n.feature().title.as_str()).collect()
    }

    fn raw(self) -> &'a FeatureNode {
        &self.arena.nodes[self.id.0]
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.arena, other.arena) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

/// The graph centered on one feature.
#[derive(Debug, Clone)]
pub struct FeatureGraph {
    arena: GraphArena,
    root: NodeId,
}

impl FeatureGraph {
    pub(crate) fn new(arena: GraphArena, root: NodeId) -> Self {
        Self { arena, root }
    }

    /// The requested feature's node.
    #[must_use]
    pub fn root(&self) -> NodeRef<'_> {
        self.arena.node(self.root)
    }

    /// Every node materialized for this query.
    #[must_use]
    pub fn arena(&self) -> &GraphArena {
        &self.arena
    }
}

/// The graphs of all root features, sharing one arena.
#[derive(Debug, Clone, Default)]
pub struct FeatureForest {
    arena: GraphArena,
    roots: Vec<NodeId>,
}

impl FeatureForest {
    pub(crate) fn new(arena: GraphArena, roots: Vec<NodeId>) -> Self {
        Self { arena, roots }
    }

    /// Root nodes in catalog order.
    pub fn roots(&self) -> impl ExactSizeIterator<Item = NodeRef<'_>> + '_ {
        self.roots.iter().map(move |&id| self.arena.node(id))
    }

    /// Number of roots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Whether there are no roots (an empty catalog).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Every node materialized for this query.
    #[must_use]
    pub fn arena(&self) -> &GraphArena {
        &self.arena
    }
}
