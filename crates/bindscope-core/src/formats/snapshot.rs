//! # Graph Snapshot
//!
//! The serde representation of a global graph. Node and edge ids are kept
//! so that a decoded graph is identical to the one that was encoded.

use crate::graph::{BindingNetwork, GlobalGraph};
use crate::node::{Edge, Node};
use crate::{EdgeId, GraphError, NodeId};
use serde::{Deserialize, Serialize};

/// A node with its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedNode {
    pub id: u64,
    pub node: Node,
}

/// An edge with its id and endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedEdge {
    pub id: u64,
    pub source: u64,
    pub target: u64,
    pub edge: Edge,
}

/// Serializable representation of a global graph.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SerializableGraph {
    #[serde(default)]
    pub full_binding_graph: bool,
    #[serde(default)]
    pub nodes: Vec<SerializedNode>,
    #[serde(default)]
    pub edges: Vec<SerializedEdge>,
}

impl From<&GlobalGraph> for SerializableGraph {
    fn from(graph: &GlobalGraph) -> Self {
        Self {
            full_binding_graph: graph.is_full_binding_graph(),
            nodes: graph
                .nodes()
                .map(|(id, node)| SerializedNode {
                    id: id.0,
                    node: node.clone(),
                })
                .collect(),
            edges: graph
                .edges()
                .map(|e| SerializedEdge {
                    id: e.id.0,
                    source: e.endpoints.source.0,
                    target: e.endpoints.target.0,
                    edge: e.edge.clone(),
                })
                .collect(),
        }
    }
}

impl TryFrom<SerializableGraph> for GlobalGraph {
    type Error = GraphError;

    /// Rebuilds through the builder, so the decoded graph is fully validated.
    fn try_from(sg: SerializableGraph) -> Result<Self, Self::Error> {
        let mut builder = GlobalGraph::builder().full_binding_graph(sg.full_binding_graph);
        for n in sg.nodes {
            builder.import_node(NodeId(n.id), n.node)?;
        }
        for e in sg.edges {
            builder.import_edge(EdgeId(e.id), NodeId(e.source), NodeId(e.target), e.edge)?;
        }
        builder.build()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ComponentNode;
    use crate::{ComponentId, ComponentPath, Key};

    fn path(s: &str) -> ComponentPath {
        s.parse().expect("path")
    }

    #[test]
    fn snapshot_preserves_ids_and_flag() {
        let mut builder = GlobalGraph::builder().full_binding_graph(true);
        let app = builder.add_node(
            ComponentNode::new(path("App")).with_children(vec![ComponentId::new("Child")]),
        );
        let child = builder.add_node(ComponentNode::new(path("App/Child")));
        builder.add_edge(app, child, Edge::entry_point(Key::new("Child")));
        let graph = builder.build().expect("build");

        let snapshot = SerializableGraph::from(&graph);
        assert!(snapshot.full_binding_graph);
        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.edges[0].source, app.0);
        assert_eq!(snapshot.edges[0].target, child.0);

        let restored = GlobalGraph::try_from(snapshot.clone()).expect("restore");
        assert_eq!(SerializableGraph::from(&restored), snapshot);
    }

    #[test]
    fn snapshot_with_dangling_edge_rejected() {
        let snapshot = SerializableGraph {
            full_binding_graph: false,
            nodes: vec![SerializedNode {
                id: 0,
                node: ComponentNode::new(path("App")).into(),
            }],
            edges: vec![SerializedEdge {
                id: 0,
                source: 0,
                target: 9,
                edge: Edge::SubcomponentCreatorBinding,
            }],
        };
        assert!(matches!(
            GlobalGraph::try_from(snapshot),
            Err(GraphError::DanglingEdge { .. })
        ));
    }
}
