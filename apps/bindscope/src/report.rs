//! # Command Reports
//!
//! Serializable summaries produced by the CLI commands. The same report is
//! printed as text or, with `--json`, as pretty JSON.

use bindscope_core::{
    Binding, BindingNetwork, BindingNode, ComponentView, Edge, EdgeRef, GlobalGraph, GraphError,
    Node, NodeId, NodeKind,
};
use serde::Serialize;
use std::collections::BTreeMap;

// =============================================================================
// TREE
// =============================================================================

/// One component view and, recursively, its sub-views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewSummary {
    pub path: String,
    pub subcomponent: bool,
    /// Keys of the bindings visible in the view, in graph order.
    pub bindings: Vec<String>,
    pub children: Vec<ViewSummary>,
}

impl ViewSummary {
    /// Walks `subgraphs()` from `view` down.
    pub fn collect(view: &ComponentView<'_>) -> Result<Self, GraphError> {
        let children = view
            .subgraphs()?
            .iter()
            .map(ViewSummary::collect)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            path: view.component_path().to_string(),
            subcomponent: view.component_node().is_subcomponent(),
            bindings: view
                .binding_nodes()
                .iter()
                .map(|n| n.key().to_string())
                .collect(),
            children,
        })
    }
}

// =============================================================================
// VIEW
// =============================================================================

/// A node as shown in a view listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSummary {
    pub id: u64,
    pub kind: &'static str,
    pub owner: String,
    pub label: String,
}

impl NodeSummary {
    #[must_use]
    pub fn new(id: NodeId, node: &Node) -> Self {
        let label = match node {
            Node::Component(c) => c.path.to_string(),
            Node::Binding(b) => binding_label(b),
            Node::MissingBinding(m) => m.key.to_string(),
        };
        Self {
            id: id.0,
            kind: node.kind().name(),
            owner: node.component_path().to_string(),
            label,
        }
    }
}

/// An edge as shown in a view listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeSummary {
    pub id: u64,
    pub source: u64,
    pub target: u64,
    pub kind: &'static str,
    pub label: Option<String>,
}

impl From<EdgeRef<'_>> for EdgeSummary {
    fn from(e: EdgeRef<'_>) -> Self {
        let label = match e.edge {
            Edge::Dependency { request, .. } => Some(request.to_string()),
            Edge::ChildFactoryMethod { factory_method } => Some(factory_method.clone()),
            Edge::SubcomponentCreatorBinding => None,
        };
        Self {
            id: e.id.0,
            source: e.endpoints.source.0,
            target: e.endpoints.target.0,
            kind: e.edge.name(),
            label,
        }
    }
}

/// A factory method as `name` plus `param: Type (kind)` entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactoryMethodSummary {
    pub name: String,
    pub parameters: Vec<String>,
}

/// Everything one component view contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewReport {
    pub path: String,
    pub component_type: String,
    pub subcomponent: bool,
    pub real_component: bool,
    pub scopes: Vec<String>,
    pub children: Vec<String>,
    pub modules: Vec<String>,
    pub requirements: Vec<String>,
    pub factory_method: Option<FactoryMethodSummary>,
    /// Paths of this component and every descendant.
    pub descriptors: Vec<String>,
    pub nodes: Vec<NodeSummary>,
    pub edges: Vec<EdgeSummary>,
    pub missing: Vec<String>,
}

impl ViewReport {
    pub fn collect(view: &ComponentView<'_>) -> Result<Self, GraphError> {
        let component = view.component_node();
        Ok(Self {
            path: view.component_path().to_string(),
            component_type: view.component_type().to_string(),
            subcomponent: component.is_subcomponent(),
            real_component: component.is_real_component,
            scopes: component.scopes.iter().cloned().collect(),
            children: view
                .subgraphs()?
                .iter()
                .map(|c| c.component_path().to_string())
                .collect(),
            modules: view.owned_module_types().iter().cloned().collect(),
            requirements: view
                .component_requirements()
                .iter()
                .map(ToString::to_string)
                .collect(),
            factory_method: view.factory_method().map(|f| FactoryMethodSummary {
                name: f.name.clone(),
                parameters: view
                    .factory_method_parameters()
                    .iter()
                    .map(|p| format!("{}: {}", p.name, p.requirement))
                    .collect(),
            }),
            descriptors: view
                .component_descriptors()?
                .iter()
                .map(|c| c.path.to_string())
                .collect(),
            nodes: view
                .nodes()
                .map(|(id, node)| NodeSummary::new(id, node))
                .collect(),
            edges: view.edges().map(EdgeSummary::from).collect(),
            missing: view
                .missing_binding_nodes()
                .map(|m| m.key.to_string())
                .collect(),
        })
    }
}

// =============================================================================
// LOOKUP
// =============================================================================

/// Which resolution a lookup performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    Contribution,
    MembersInjection,
}

/// The binding a lookup resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedBinding {
    /// Component that owns the binding.
    pub owner: String,
    pub kind: &'static str,
    pub dependencies: Vec<String>,
    pub scope: Option<String>,
    pub module: Option<String>,
    pub injection_sites: Vec<String>,
}

impl ResolvedBinding {
    #[must_use]
    pub fn new(node: &BindingNode) -> Self {
        let owner = node.path.to_string();
        match &node.binding {
            Binding::Contribution(c) => Self {
                owner,
                kind: c.kind.name(),
                dependencies: c.dependencies.iter().map(ToString::to_string).collect(),
                scope: c.scope.clone(),
                module: c.contributing_module.clone(),
                injection_sites: Vec::new(),
            },
            Binding::MembersInjection(m) => Self {
                owner,
                kind: "members-injection",
                dependencies: Vec::new(),
                scope: None,
                module: None,
                injection_sites: m.injection_sites.clone(),
            },
        }
    }
}

/// Result of resolving one key in one view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupReport {
    pub path: String,
    pub key: String,
    pub lookup: LookupKind,
    pub binding: Option<ResolvedBinding>,
}

// =============================================================================
// STATS
// =============================================================================

/// Node and edge counts for the whole graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsReport {
    pub full_binding_graph: bool,
    pub root: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes_by_kind: BTreeMap<&'static str, usize>,
    pub edges_by_kind: BTreeMap<&'static str, usize>,
}

impl StatsReport {
    #[must_use]
    pub fn collect(graph: &GlobalGraph) -> Self {
        let nodes_by_kind = NodeKind::ALL
            .iter()
            .map(|k| (k.name(), graph.classified_nodes(*k).len()))
            .collect();
        let mut edges_by_kind = BTreeMap::new();
        for e in graph.edges() {
            *edges_by_kind.entry(e.edge.name()).or_insert(0) += 1;
        }
        Self {
            full_binding_graph: graph.is_full_binding_graph(),
            root: graph.root_path().to_string(),
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            nodes_by_kind,
            edges_by_kind,
        }
    }
}

fn binding_label(node: &BindingNode) -> String {
    match &node.binding {
        Binding::Contribution(c) => format!("{} ({})", c.key, c.kind.name()),
        Binding::MembersInjection(m) => format!("{} (members-injection)", m.key),
    }
}
