//! # Network
//!
//! The directed-multigraph topology under every binding graph.
//!
//! A `Network` stores only ids: node payloads and edge payloads live in the
//! `GlobalGraph` that owns it. It supports exactly the two primitives the
//! engine needs, forward reachability from a seed and induced sub-networks.
//! All data structures use `BTreeMap`/`BTreeSet` for deterministic ordering.

use crate::{EdgeId, NodeId};
use std::collections::{BTreeMap, BTreeSet};

/// The endpoints of one directed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EndpointPair {
    pub source: NodeId,
    pub target: NodeId,
}

/// An immutable-after-build adjacency structure.
///
/// Parallel edges between the same pair of nodes are allowed; each has its
/// own `EdgeId`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Network {
    /// Every node in the network.
    nodes: BTreeSet<NodeId>,

    /// Edge storage: EdgeId -> endpoints
    edges: BTreeMap<EdgeId, EndpointPair>,

    /// Outgoing edges: source -> EdgeIds
    out_edges: BTreeMap<NodeId, BTreeSet<EdgeId>>,
}

impl Network {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_node(&mut self, node: NodeId) {
        self.nodes.insert(node);
    }

    /// Adds an edge. Both endpoints must already be present.
    pub(crate) fn add_edge(&mut self, id: EdgeId, source: NodeId, target: NodeId) -> bool {
        if !self.nodes.contains(&source) || !self.nodes.contains(&target) {
            return false;
        }
        self.edges.insert(id, EndpointPair { source, target });
        self.out_edges.entry(source).or_default().insert(id);
        true
    }

    /// All nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    /// All edges in ascending id order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, EndpointPair)> + '_ {
        self.edges.iter().map(|(id, pair)| (*id, *pair))
    }

    #[must_use]
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    #[must_use]
    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        self.edges.contains_key(&edge)
    }

    #[must_use]
    pub fn endpoints(&self, edge: EdgeId) -> Option<EndpointPair> {
        self.edges.get(&edge).copied()
    }

    /// Outgoing edges of `node`, in ascending id order.
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.out_edges
            .get(&node)
            .into_iter()
            .flat_map(|edges| edges.iter().copied())
    }

    /// Direct successors of `node`. A successor reached by parallel edges is
    /// yielded once per edge.
    pub fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.out_edges(node)
            .filter_map(move |edge| self.edges.get(&edge).map(|pair| pair.target))
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Every node reachable from `seed` along forward edges, including `seed`.
    ///
    /// Returns an empty set if `seed` is not in the network. Iterative
    /// depth-first search; each node is visited once.
    #[must_use]
    pub fn reachable_nodes(&self, seed: NodeId) -> BTreeSet<NodeId> {
        let mut visited = BTreeSet::new();
        if !self.contains_node(seed) {
            return visited;
        }

        let mut stack = vec![seed];
        visited.insert(seed);

        while let Some(current) = stack.pop() {
            for next in self.successors(current) {
                if visited.insert(next) {
                    stack.push(next);
                }
            }
        }

        visited
    }

    /// The sub-network on `keep`: those nodes (that exist here) and every
    /// edge whose two endpoints are both kept.
    #[must_use]
    pub fn induced_subgraph(&self, keep: &BTreeSet<NodeId>) -> Network {
        let mut sub = Network::new();
        for node in keep.iter().filter(|n| self.nodes.contains(n)) {
            sub.add_node(*node);
        }
        for node in sub.nodes.clone() {
            for edge in self.out_edges(node) {
                if let Some(pair) = self.edges.get(&edge)
                    && sub.nodes.contains(&pair.target)
                {
                    sub.add_edge(edge, pair.source, pair.target);
                }
            }
        }
        sub
    }
}

// =============================================================================
// TESTS
// =============================================================================
