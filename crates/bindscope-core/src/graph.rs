//! # Global Graph
//!
//! The immutable binding graph spanning every component of a build unit.
//!
//! A `GlobalGraph` is assembled once by a `GlobalGraphBuilder`, validated,
//! and never mutated afterwards. Component views borrow it; it outlives all
//! of them. All data structures use `BTreeMap` for deterministic ordering.

use crate::network::{EndpointPair, Network};
use crate::node::{BindingNode, ComponentNode, Edge, MissingBindingNode, Node, NodeKind};
use crate::view::ComponentView;
use crate::{ComponentPath, EdgeId, GraphError, Key, NodeId};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

static EMPTY_NODE_SET: BTreeSet<NodeId> = BTreeSet::new();

// =============================================================================
// BINDING NETWORK TRAIT
// =============================================================================

/// One edge of a binding network, resolved against its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRef<'a> {
    pub id: EdgeId,
    pub endpoints: EndpointPair,
    pub source: &'a Node,
    pub target: &'a Node,
    pub edge: &'a Edge,
}

/// The query surface shared by the global graph and every component view.
///
/// Implementors supply the topology (`network`) and the graph that owns the
/// node and edge payloads; everything else is derived from those two.
pub trait BindingNetwork {
    /// The global graph owning every node and edge payload.
    fn global_graph(&self) -> &GlobalGraph;

    /// The topology of this binding network.
    fn network(&self) -> &Network;

    /// Whether the owning graph is a full (validation-only) binding graph.
    fn is_full_binding_graph(&self) -> bool {
        self.global_graph().is_full_binding_graph()
    }

    /// All nodes with their ids, in ascending id order.
    fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        let graph = self.global_graph();
        self.network()
            .nodes()
            .filter_map(move |id| graph.node(id).map(|node| (id, node)))
    }

    /// All edges resolved to their payloads, in ascending id order.
    fn edges(&self) -> impl Iterator<Item = EdgeRef<'_>> + '_ {
        let graph = self.global_graph();
        self.network()
            .edges()
            .filter_map(move |(id, endpoints)| graph.edge_ref(id, endpoints))
    }

    /// Nodes of one kind, backed by the global graph's classification index.
    fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        let graph = self.global_graph();
        let network = self.network();
        graph
            .classified_nodes(kind)
            .iter()
            .copied()
            .filter(move |id| network.contains_node(*id))
            .filter_map(move |id| graph.node(id).map(|node| (id, node)))
    }

    fn component_nodes(&self) -> impl Iterator<Item = &ComponentNode> + '_ {
        self.nodes_of_kind(NodeKind::Component)
            .filter_map(|(_, node)| node.as_component())
    }

    fn missing_binding_nodes(&self) -> impl Iterator<Item = &MissingBindingNode> + '_ {
        self.nodes_of_kind(NodeKind::MissingBinding)
            .filter_map(|(_, node)| node.as_missing_binding())
    }

    /// Dependency edges, entry points included.
    fn dependency_edges(&self) -> impl Iterator<Item = EdgeRef<'_>> + '_ {
        self.edges().filter(|e| e.edge.is_dependency())
    }

    /// Dependency edges that start at a component entry point.
    fn entry_point_edges(&self) -> impl Iterator<Item = EdgeRef<'_>> + '_ {
        self.edges().filter(|e| e.edge.is_entry_point())
    }
}

// =============================================================================
// GLOBAL GRAPH
// =============================================================================

/// The full node/edge set for one build unit.
#[derive(Debug)]
pub struct GlobalGraph {
    /// Node storage: NodeId -> Node
    nodes: BTreeMap<NodeId, Node>,

    /// Edge storage: EdgeId -> Edge
    edges: BTreeMap<EdgeId, Edge>,

    /// Topology over the ids above.
    network: Network,

    /// Component lookup: path -> component NodeId
    component_index: BTreeMap<ComponentPath, NodeId>,

    /// Path of the single root component.
    root_path: ComponentPath,

    /// Full (validation-only) graph versus a resolvable one.
    full_binding_graph: bool,

    /// Classification index: kind -> NodeIds, computed on first use.
    nodes_by_kind: OnceLock<BTreeMap<NodeKind, BTreeSet<NodeId>>>,
}

impl GlobalGraph {
    /// Start assembling a graph.
    #[must_use]
    pub fn builder() -> GlobalGraphBuilder {
        GlobalGraphBuilder::new()
    }

    #[must_use]
    pub fn is_full_binding_graph(&self) -> bool {
        self.full_binding_graph
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub(crate) fn edge_ref(&self, id: EdgeId, endpoints: EndpointPair) -> Option<EdgeRef<'_>> {
        Some(EdgeRef {
            id,
            endpoints,
            source: self.nodes.get(&endpoints.source)?,
            target: self.nodes.get(&endpoints.target)?,
            edge: self.edges.get(&id)?,
        })
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn root_path(&self) -> &ComponentPath {
        &self.root_path
    }

    /// Ids of every node of `kind`.
    ///
    /// The index is built on first call for all kinds at once and reused for
    /// the lifetime of the graph.
    #[must_use]
    pub fn classified_nodes(&self, kind: NodeKind) -> &BTreeSet<NodeId> {
        self.nodes_by_kind
            .get_or_init(|| {
                let mut index: BTreeMap<NodeKind, BTreeSet<NodeId>> = BTreeMap::new();
                for (id, node) in &self.nodes {
                    index.entry(node.kind()).or_default().insert(*id);
                }
                tracing::trace!(nodes = self.nodes.len(), "classified global graph nodes");
                index
            })
            .get(&kind)
            .unwrap_or(&EMPTY_NODE_SET)
    }

    /// The component node owning exactly `path`, with its id.
    pub fn component_node_entry(
        &self,
        path: &ComponentPath,
    ) -> Result<(NodeId, &ComponentNode), GraphError> {
        self.component_index
            .get(path)
            .and_then(|id| {
                self.nodes
                    .get(id)
                    .and_then(Node::as_component)
                    .map(|node| (*id, node))
            })
            .ok_or_else(|| GraphError::MissingComponentNode { path: path.clone() })
    }

    /// The component node owning exactly `path`.
    pub fn component_node_for(&self, path: &ComponentPath) -> Result<&ComponentNode, GraphError> {
        self.component_node_entry(path).map(|(_, node)| node)
    }

    pub fn root_component_node(&self) -> Result<&ComponentNode, GraphError> {
        self.component_node_for(&self.root_path)
    }

    /// Binding nodes for `key` across every component.
    pub fn binding_nodes_for<'a>(&'a self, key: &'a Key) -> impl Iterator<Item = &'a BindingNode> {
        self.classified_nodes(NodeKind::Binding)
            .iter()
            .filter_map(|id| self.nodes.get(id).and_then(Node::as_binding))
            .filter(move |node| node.key() == key)
    }

    /// A view of the component at `path`.
    pub fn view(&self, path: &ComponentPath) -> Result<ComponentView<'_>, GraphError> {
        ComponentView::new(self, path.clone())
    }

    /// The view of the root component; descendants come from `subgraphs()`.
    pub fn root_view(&self) -> Result<ComponentView<'_>, GraphError> {
        self.view(&self.root_path)
    }
}

impl BindingNetwork for GlobalGraph {
    fn global_graph(&self) -> &GlobalGraph {
        self
    }

    fn network(&self) -> &Network {
        &self.network
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Assembles and validates a [`GlobalGraph`].
#[derive(Debug, Clone, Default)]
pub struct GlobalGraphBuilder {
    nodes: BTreeMap<NodeId, Node>,

    /// Structural de-duplication: Node -> NodeId
    node_index: BTreeMap<Node, NodeId>,

    edges: BTreeMap<EdgeId, (EndpointPair, Edge)>,

    next_node_id: u64,
    next_edge_id: u64,
    full_binding_graph: bool,
}

impl GlobalGraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the graph as a full (validation-only) binding graph.
    #[must_use]
    pub fn full_binding_graph(mut self, full: bool) -> Self {
        self.full_binding_graph = full;
        self
    }

    /// Insert a node and return its id.
    /// If an equal node was already added, returns the existing id.
    pub fn add_node(&mut self, node: impl Into<Node>) -> NodeId {
        let node = node.into();
        if let Some(&id) = self.node_index.get(&node) {
            return id;
        }

        let id = NodeId(self.next_node_id);
        self.next_node_id = self.next_node_id.saturating_add(1);
        self.node_index.insert(node.clone(), id);
        self.nodes.insert(id, node);
        id
    }

    /// Insert an edge. Endpoints are checked by `build`.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, edge: Edge) -> EdgeId {
        let id = EdgeId(self.next_edge_id);
        self.next_edge_id = self.next_edge_id.saturating_add(1);
        self.edges.insert(id, (EndpointPair { source, target }, edge));
        id
    }

    /// Insert a node under a previously assigned id (used when decoding).
    pub fn import_node(&mut self, id: NodeId, node: Node) -> Result<(), GraphError> {
        if self.nodes.contains_key(&id) || self.node_index.contains_key(&node) {
            return Err(GraphError::DeserializationError(format!(
                "duplicate node {:?}",
                id
            )));
        }
        if id.0 >= self.next_node_id {
            self.next_node_id = id.0.saturating_add(1);
        }
        self.node_index.insert(node.clone(), id);
        self.nodes.insert(id, node);
        Ok(())
    }

    /// Insert an edge under a previously assigned id (used when decoding).
    pub fn import_edge(
        &mut self,
        id: EdgeId,
        source: NodeId,
        target: NodeId,
        edge: Edge,
    ) -> Result<(), GraphError> {
        if self.edges.contains_key(&id) {
            return Err(GraphError::DeserializationError(format!(
                "duplicate edge {:?}",
                id
            )));
        }
        if id.0 >= self.next_edge_id {
            self.next_edge_id = id.0.saturating_add(1);
        }
        self.edges.insert(id, (EndpointPair { source, target }, edge));
        Ok(())
    }

    /// Validate and freeze the graph.
    ///
    /// Checks that every edge endpoint exists, that each path has at most
    /// one component node, that there is exactly one root component, and
    /// that every declared child and every node owner has a component node.
    /// Every subcomponent must also be listed exactly once in its parent's
    /// `children`.
    pub fn build(self) -> Result<GlobalGraph, GraphError> {
        let mut network = Network::new();
        for id in self.nodes.keys() {
            network.add_node(*id);
        }

        let mut edges = BTreeMap::new();
        for (id, (endpoints, edge)) in self.edges {
            if !network.add_edge(id, endpoints.source, endpoints.target) {
                return Err(GraphError::DanglingEdge {
                    source_node: endpoints.source,
                    target_node: endpoints.target,
                });
            }
            edges.insert(id, edge);
        }

        let mut component_index = BTreeMap::new();
        let mut roots = Vec::new();
        for (id, node) in &self.nodes {
            let Some(component) = node.as_component() else {
                continue;
            };
            if component_index.insert(component.path.clone(), *id).is_some() {
                return Err(GraphError::DuplicateComponentNode {
                    path: component.path.clone(),
                });
            }
            if component.path.at_root() {
                roots.push(component.path.clone());
            }
        }

        let root_path = match roots.len() {
            0 => return Err(GraphError::MissingRootComponent),
            1 => roots.remove(0),
            _ => return Err(GraphError::MultipleRootComponents { roots }),
        };

        for node in self.nodes.values() {
            if !component_index.contains_key(node.component_path()) {
                return Err(GraphError::MissingComponentNode {
                    path: node.component_path().clone(),
                });
            }
            if let Some(component) = node.as_component() {
                let mut declared = BTreeSet::new();
                for child in &component.children {
                    if !declared.insert(child) {
                        return Err(GraphError::DuplicateChildDeclaration {
                            path: component.path.child(child.clone()),
                        });
                    }
                }
                for child in component.child_paths() {
                    if !component_index.contains_key(&child) {
                        return Err(GraphError::MissingComponentNode { path: child });
                    }
                }
                if let Some(parent) = component.path.parent() {
                    let declares_child = component_index
                        .get(&parent)
                        .and_then(|id| self.nodes.get(id))
                        .and_then(Node::as_component)
                        .ok_or_else(|| GraphError::MissingComponentNode {
                            path: parent.clone(),
                        })?
                        .children
                        .contains(component.path.current_component());
                    if !declares_child {
                        return Err(GraphError::UndeclaredComponent {
                            path: component.path.clone(),
                        });
                    }
                }
            }
        }

        tracing::debug!(
            root = %root_path,
            nodes = self.nodes.len(),
            edges = edges.len(),
            components = component_index.len(),
            full = self.full_binding_graph,
            "built global graph"
        );

        Ok(GlobalGraph {
            nodes: self.nodes,
            edges,
            network,
            component_index,
            root_path,
            full_binding_graph: self.full_binding_graph,
            nodes_by_kind: OnceLock::new(),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
