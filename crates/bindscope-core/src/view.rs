//! # Component View
//!
//! The projection of the global graph visible to one component.
//!
//! A view is identified by its `ComponentPath` and a shared borrow of the
//! `GlobalGraph`. Every derived field (network, binding index, sub-views) is
//! computed on first access and cached for the life of the view; the
//! `OnceLock` cells guarantee a single computation even under concurrent
//! first access. A view never refers to its parent.

use crate::graph::{BindingNetwork, GlobalGraph};
use crate::network::Network;
use crate::node::{
    BindingNode, ComponentNode, ComponentRequirement, ContributionBinding, FactoryMethod,
    FactoryMethodParameter, MembersInjectionBinding,
};
use crate::{ComponentId, ComponentPath, GraphError, Key, NodeId};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

/// Per-component view over a [`GlobalGraph`].
#[derive(Debug)]
pub struct ComponentView<'g> {
    graph: &'g GlobalGraph,
    path: ComponentPath,

    /// Resolved component node for `path`.
    component_id: NodeId,
    component: &'g ComponentNode,

    network: OnceLock<Network>,
    binding_nodes: OnceLock<Vec<&'g BindingNode>>,
    binding_nodes_by_key: OnceLock<BTreeMap<&'g Key, Vec<&'g BindingNode>>>,
    subgraphs: OnceLock<Result<Vec<ComponentView<'g>>, GraphError>>,
}

impl<'g> ComponentView<'g> {
    /// Create the view for `path`.
    ///
    /// Fails with `MissingComponentNode` if no component node owns exactly
    /// `path`; a path produced by this graph's own enumeration never does.
    pub fn new(graph: &'g GlobalGraph, path: ComponentPath) -> Result<Self, GraphError> {
        let (component_id, component) = graph.component_node_entry(&path)?;
        Ok(Self {
            graph,
            path,
            component_id,
            component,
            network: OnceLock::new(),
            binding_nodes: OnceLock::new(),
            binding_nodes_by_key: OnceLock::new(),
            subgraphs: OnceLock::new(),
        })
    }

    #[must_use]
    pub fn component_path(&self) -> &ComponentPath {
        &self.path
    }

    #[must_use]
    pub fn component_node(&self) -> &'g ComponentNode {
        self.component
    }

    #[must_use]
    pub fn component_node_id(&self) -> NodeId {
        self.component_id
    }

    // =========================================================================
    // COMPONENT DESCRIPTOR
    // =========================================================================

    /// The component this view is for (the last element of its path).
    #[must_use]
    pub fn component_type(&self) -> &ComponentId {
        self.path.current_component()
    }

    /// Module types installed directly in this component.
    #[must_use]
    pub fn owned_module_types(&self) -> &'g BTreeSet<String> {
        &self.component.owned_modules
    }

    /// The parent's factory method creating this component, if any.
    #[must_use]
    pub fn factory_method(&self) -> Option<&'g FactoryMethod> {
        self.component.factory_method.as_ref()
    }

    /// Parameters of `factory_method()`; empty when there is none.
    #[must_use]
    pub fn factory_method_parameters(&self) -> &'g [FactoryMethodParameter] {
        self.component
            .factory_method
            .as_ref()
            .map(|f| f.parameters.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn component_requirements(&self) -> &'g BTreeSet<ComponentRequirement> {
        &self.component.component_requirements
    }

    /// Component nodes of this view and every descendant, depth-first
    /// pre-order.
    pub fn component_descriptors(&self) -> Result<Vec<&'g ComponentNode>, GraphError> {
        Ok(self
            .descendants()?
            .into_iter()
            .map(|view| view.component_node())
            .collect())
    }

    // =========================================================================
    // NETWORK
    // =========================================================================

    /// Nodes reachable from this component's node and owned by this
    /// component or one of its descendants, with every edge between them.
    fn compute_network(&self) -> Network {
        let global = self.graph.network();
        let reachable = global.reachable_nodes(self.component_id);
        let owned: BTreeSet<NodeId> = reachable
            .iter()
            .copied()
            .filter(|id| {
                self.graph
                    .node(*id)
                    .is_some_and(|node| self.path.is_prefix_of(node.component_path()))
            })
            .collect();

        tracing::debug!(
            path = %self.path,
            reachable = reachable.len(),
            retained = owned.len(),
            "computed component network"
        );

        global.induced_subgraph(&owned)
    }

    // =========================================================================
    // BINDING INDEX
    // =========================================================================

    /// All binding nodes in this view, in ascending node id order.
    pub fn binding_nodes(&self) -> &[&'g BindingNode] {
        self.binding_nodes.get_or_init(|| {
            #[cfg(test)]
            tests::BINDING_PASSES.with(|c| c.set(c.get() + 1));

            let graph = self.graph;
            self.network()
                .nodes()
                .filter_map(|id| graph.node(id).and_then(|node| node.as_binding()))
                .collect()
        })
    }

    fn binding_nodes_by_key(&self) -> &BTreeMap<&'g Key, Vec<&'g BindingNode>> {
        self.binding_nodes_by_key.get_or_init(|| {
            let mut index: BTreeMap<&'g Key, Vec<&'g BindingNode>> = BTreeMap::new();
            for node in self.binding_nodes().iter().copied() {
                index.entry(node.key()).or_default().push(node);
            }
            index
        })
    }

    /// Binding nodes in this view whose key is `key`. Empty if none.
    pub fn binding_nodes_for(&self, key: &Key) -> &[&'g BindingNode] {
        self.binding_nodes_by_key()
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The unique contribution binding for `key`.
    ///
    /// Zero matches is `MissingBinding`; more than one is `AmbiguousBinding`.
    pub fn contribution_binding(&self, key: &Key) -> Result<&'g ContributionBinding, GraphError> {
        let matches: Vec<&'g ContributionBinding> = self
            .binding_nodes_for(key)
            .iter()
            .copied()
            .filter_map(|node| node.binding.as_contribution())
            .collect();

        match matches.as_slice() {
            [only] => Ok(*only),
            [] => Err(GraphError::MissingBinding {
                path: self.path.clone(),
                key: key.clone(),
            }),
            _ => Err(GraphError::AmbiguousBinding {
                path: self.path.clone(),
                key: key.clone(),
                count: matches.len(),
            }),
        }
    }

    /// The members-injection binding for `key`, if there is one.
    ///
    /// More than one match is `AmbiguousOptionalBinding`.
    pub fn members_injection_binding(
        &self,
        key: &Key,
    ) -> Result<Option<&'g MembersInjectionBinding>, GraphError> {
        let matches: Vec<&'g MembersInjectionBinding> = self
            .binding_nodes_for(key)
            .iter()
            .copied()
            .filter_map(|node| node.binding.as_members_injection())
            .collect();

        match matches.as_slice() {
            [] => Ok(None),
            [only] => Ok(Some(*only)),
            _ => Err(GraphError::AmbiguousOptionalBinding {
                path: self.path.clone(),
                key: key.clone(),
                count: matches.len(),
            }),
        }
    }

    // =========================================================================
    // SUBGRAPHS
    // =========================================================================

    /// One view per child component, in the order the children are declared.
    pub fn subgraphs(&self) -> Result<&[ComponentView<'g>], GraphError> {
        self.subgraphs
            .get_or_init(|| {
                tracing::trace!(
                    path = %self.path,
                    children = self.component.children.len(),
                    "enumerating subgraphs"
                );
                self.component
                    .child_paths()
                    .map(|child| ComponentView::new(self.graph, child))
                    .collect()
            })
            .as_deref()
            .map_err(Clone::clone)
    }

    /// This view followed by every nested sub-view, depth-first pre-order.
    pub fn descendants(&self) -> Result<Vec<&ComponentView<'g>>, GraphError> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out)?;
        Ok(out)
    }

    fn collect_descendants<'a>(
        &'a self,
        out: &mut Vec<&'a ComponentView<'g>>,
    ) -> Result<(), GraphError> {
        out.push(self);
        for child in self.subgraphs()? {
            child.collect_descendants(out)?;
        }
        Ok(())
    }

    /// The view for `path` among this view and its descendants, found by
    /// walking `subgraphs()`. `None` if `path` is not in this sub-tree.
    pub fn find(&self, path: &ComponentPath) -> Result<Option<&ComponentView<'g>>, GraphError> {
        if &self.path == path {
            return Ok(Some(self));
        }
        if !self.path.is_prefix_of(path) {
            return Ok(None);
        }
        for child in self.subgraphs()? {
            if child.path.is_prefix_of(path) {
                return child.find(path);
            }
        }
        Ok(None)
    }
}

impl BindingNetwork for ComponentView<'_> {
    fn global_graph(&self) -> &GlobalGraph {
        self.graph
    }

    fn network(&self) -> &Network {
        self.network.get_or_init(|| self.compute_network())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::node::{
        Binding, ContributionKind, Edge, MissingBindingNode, Node, NodeKind, RequirementKind,
    };
    use std::cell::Cell;

    thread_local! {
        /// Number of times a binding-node pass ran on this thread.
        pub(crate) static BINDING_PASSES: Cell<usize> = const { Cell::new(0) };
    }

    fn path(s: &str) -> ComponentPath {
        s.parse().expect("path")
    }

    fn contribution(owner: &str, key: Key) -> BindingNode {
        BindingNode::new(
            path(owner),
            Binding::Contribution(ContributionBinding::new(key, ContributionKind::Provision)),
        )
    }

    fn members(owner: &str, key: Key) -> BindingNode {
        BindingNode::new(
            path(owner),
            Binding::MembersInjection(MembersInjectionBinding::new(key, vec!["field".into()])),
        )
    }

    fn component(p: &str, children: &[&str]) -> ComponentNode {
        ComponentNode::new(path(p))
            .with_children(children.iter().map(|c| ComponentId::new(*c)).collect())
    }

    /// App -> Session -> Screen, each owning one binding, plus a sibling
    /// `Settings` whose binding depends on the root's.
    fn hierarchy() -> GlobalGraph {
        let mut b = GlobalGraph::builder();
        let app = b.add_node(component("App", &["Session", "Settings"]));
        let session = b.add_node(component("App/Session", &["Screen"]));
        let screen = b.add_node(component("App/Session/Screen", &[]));
        let settings = b.add_node(component("App/Settings", &[]));

        let clock = b.add_node(contribution("App", Key::new("Clock")));
        let user = b.add_node(contribution("App/Session", Key::new("User")));
        let view = b.add_node(contribution("App/Session/Screen", Key::new("View")));
        let prefs = b.add_node(contribution("App/Settings", Key::new("Prefs")));

        let child = |name: &str| Edge::ChildFactoryMethod {
            factory_method: name.to_string(),
        };
        b.add_edge(app, session, child("session"));
        b.add_edge(app, settings, child("settings"));
        b.add_edge(session, screen, child("screen"));
        b.add_edge(app, clock, Edge::entry_point(Key::new("Clock")));
        b.add_edge(session, user, Edge::entry_point(Key::new("User")));
        b.add_edge(screen, view, Edge::entry_point(Key::new("View")));
        b.add_edge(settings, prefs, Edge::entry_point(Key::new("Prefs")));
        b.add_edge(view, user, Edge::dependency(Key::new("User")));
        b.add_edge(user, clock, Edge::dependency(Key::new("Clock")));
        b.add_edge(prefs, clock, Edge::dependency(Key::new("Clock")));
        b.build().expect("build")
    }

    fn keys(view: &ComponentView<'_>) -> Vec<String> {
        view.binding_nodes()
            .iter()
            .map(|n| n.key().to_string())
            .collect()
    }

    #[test]
    fn network_excludes_ancestor_nodes() {
        let graph = hierarchy();
        let root = graph.root_view().expect("root");
        let session = &root.subgraphs().expect("subgraphs")[0];

        // Screen's View -> Session's User -> App's Clock: Clock is reachable
        // from Session but owned by the parent, so it is not visible.
        assert_eq!(keys(session), vec!["User", "View"]);
        assert!(
            session
                .nodes()
                .all(|(_, n)| path("App/Session").is_prefix_of(n.component_path()))
        );
    }

    #[test]
    fn network_keeps_only_edges_between_kept_nodes() {
        let graph = hierarchy();
        let session = graph.view(&path("App/Session")).expect("view");

        // session->screen, session->user, screen->view, view->user.
        assert_eq!(session.edges().count(), 4);
        assert_eq!(session.entry_point_edges().count(), 2);
    }

    #[test]
    fn sibling_nodes_do_not_leak() {
        let graph = hierarchy();
        let settings = graph.view(&path("App/Settings")).expect("view");
        assert_eq!(keys(&settings), vec!["Prefs"]);
        assert_eq!(settings.component_nodes().count(), 1);
    }

    #[test]
    fn binding_nodes_computed_once() {
        let graph = hierarchy();
        let root = graph.root_view().expect("root");

        let before = BINDING_PASSES.with(Cell::get);
        let first: Vec<&BindingNode> = root.binding_nodes().to_vec();
        let second: Vec<&BindingNode> = root.binding_nodes().to_vec();
        let _ = root.binding_nodes_for(&Key::new("Clock"));
        let after = BINDING_PASSES.with(Cell::get);

        assert_eq!(first, second);
        assert_eq!(after - before, 1);
    }

    #[test]
    fn network_is_memoized() {
        let graph = hierarchy();
        let root = graph.root_view().expect("root");
        assert!(std::ptr::eq(root.network(), root.network()));
    }

    #[test]
    fn contribution_binding_exactly_one() {
        let graph = hierarchy();
        let root = graph.root_view().expect("root");

        let clock = root.contribution_binding(&Key::new("Clock")).expect("clock");
        assert_eq!(clock.kind, ContributionKind::Provision);

        assert_eq!(
            root.contribution_binding(&Key::new("Nothing")),
            Err(GraphError::MissingBinding {
                path: path("App"),
                key: Key::new("Nothing")
            })
        );
    }

    #[test]
    fn ambiguous_contribution_binding_fails() {
        let mut b = GlobalGraph::builder();
        let app = b.add_node(component("App", &[]));
        let first = b.add_node(contribution("App", Key::new("Clock")));
        let second = b.add_node(BindingNode::new(
            path("App"),
            Binding::Contribution(ContributionBinding::new(
                Key::new("Clock"),
                ContributionKind::Injection,
            )),
        ));
        b.add_edge(app, first, Edge::entry_point(Key::new("Clock")));
        b.add_edge(app, second, Edge::entry_point(Key::new("Clock")));
        let graph = b.build().expect("build");

        let root = graph.root_view().expect("root");
        assert_eq!(
            root.contribution_binding(&Key::new("Clock")),
            Err(GraphError::AmbiguousBinding {
                path: path("App"),
                key: Key::new("Clock"),
                count: 2
            })
        );
    }

    #[test]
    fn members_injection_binding_at_most_one() {
        let mut b = GlobalGraph::builder();
        let app = b.add_node(component("App", &["Child"]));
        let child = b.add_node(component("App/Child", &[]));
        let activity = Key::new("Activity");
        let injector = b.add_node(members("App", activity.clone()));
        let provider = b.add_node(contribution("App", activity.clone()));
        let dup_a = b.add_node(members("App/Child", Key::new("Fragment")));
        let dup_b = b.add_node(BindingNode::new(
            path("App/Child"),
            Binding::MembersInjection(MembersInjectionBinding::new(
                Key::new("Fragment"),
                vec!["other".into()],
            )),
        ));
        b.add_edge(app, injector, Edge::entry_point(activity.clone()));
        b.add_edge(app, provider, Edge::entry_point(activity.clone()));
        b.add_edge(app, child, Edge::SubcomponentCreatorBinding);
        b.add_edge(child, dup_a, Edge::entry_point(Key::new("Fragment")));
        b.add_edge(child, dup_b, Edge::entry_point(Key::new("Fragment")));
        let graph = b.build().expect("build");
        let root = graph.root_view().expect("root");

        // Kinds are filtered independently.
        let found = root.members_injection_binding(&activity).expect("activity");
        assert_eq!(found.map(|m| m.injection_sites.len()), Some(1));
        assert!(root.contribution_binding(&activity).is_ok());

        assert_eq!(root.members_injection_binding(&Key::new("Absent")), Ok(None));
        assert_eq!(
            root.members_injection_binding(&Key::new("Fragment")),
            Err(GraphError::AmbiguousOptionalBinding {
                path: path("App"),
                key: Key::new("Fragment"),
                count: 2
            })
        );
    }

    #[test]
    fn subgraphs_follow_declaration_order() {
        let mut b = GlobalGraph::builder();
        let app = b.add_node(component("App", &["C", "A", "B"]));
        for name in ["A", "B", "C"] {
            let child = b.add_node(component(&format!("App/{name}"), &[]));
            b.add_edge(app, child, Edge::SubcomponentCreatorBinding);
        }
        let graph = b.build().expect("build");
        let root = graph.root_view().expect("root");

        let paths: Vec<String> = root
            .subgraphs()
            .expect("subgraphs")
            .iter()
            .map(|v| v.component_path().to_string())
            .collect();
        assert_eq!(paths, vec!["App/C", "App/A", "App/B"]);
        assert!(std::ptr::eq(
            root.subgraphs().expect("first").as_ptr(),
            root.subgraphs().expect("second").as_ptr()
        ));
    }

    #[test]
    fn descendants_and_find_walk_subgraphs() {
        let graph = hierarchy();
        let root = graph.root_view().expect("root");

        let order: Vec<String> = root
            .descendants()
            .expect("descendants")
            .iter()
            .map(|v| v.component_path().to_string())
            .collect();
        assert_eq!(
            order,
            vec!["App", "App/Session", "App/Session/Screen", "App/Settings"]
        );

        let screen = root
            .find(&path("App/Session/Screen"))
            .expect("find")
            .expect("present");
        assert_eq!(keys(screen), vec!["View"]);
        assert!(root.find(&path("App/Nope")).expect("find").is_none());
        assert!(root.find(&path("Elsewhere")).expect("find").is_none());
    }

    #[test]
    fn missing_bindings_are_scoped_like_other_nodes() {
        let mut b = GlobalGraph::builder();
        let app = b.add_node(component("App", &["Child"]));
        let child = b.add_node(component("App/Child", &[]));
        let missing = b.add_node(Node::MissingBinding(MissingBindingNode {
            path: path("App/Child"),
            key: Key::new("Logger"),
        }));
        b.add_edge(app, child, Edge::SubcomponentCreatorBinding);
        b.add_edge(child, missing, Edge::entry_point(Key::new("Logger")));
        let graph = b.build().expect("build");

        let root = graph.root_view().expect("root");
        assert_eq!(root.missing_binding_nodes().count(), 1);
        assert_eq!(root.nodes_of_kind(NodeKind::MissingBinding).count(), 1);
        let child_view = &root.subgraphs().expect("subgraphs")[0];
        assert_eq!(child_view.missing_binding_nodes().count(), 1);
    }

    /// App installs `ClockModule` and needs a `Config` instance; Session is
    /// created by `session(SessionModule)` and needs `ClockModule`.
    fn described_hierarchy() -> GlobalGraph {
        let mut b = GlobalGraph::builder();
        let app = b.add_node(
            component("App", &["Session"])
                .with_module("ClockModule")
                .with_requirement(ComponentRequirement::new(
                    RequirementKind::BoundInstance,
                    "Config",
                )),
        );
        let session = b.add_node(
            component("App/Session", &[])
                .with_module("SessionModule")
                .with_requirement(ComponentRequirement::new(
                    RequirementKind::Module,
                    "SessionModule",
                ))
                .with_factory_method(
                    "session",
                    vec![FactoryMethodParameter {
                        requirement: ComponentRequirement::new(
                            RequirementKind::Module,
                            "SessionModule",
                        ),
                        name: "module".to_string(),
                    }],
                ),
        );
        b.add_edge(
            app,
            session,
            Edge::ChildFactoryMethod {
                factory_method: "session".to_string(),
            },
        );
        b.build().expect("build")
    }

    #[test]
    fn component_type_is_last_path_element() {
        let graph = hierarchy();
        let screen = graph.view(&path("App/Session/Screen")).expect("view");
        assert_eq!(screen.component_type(), &ComponentId::new("Screen"));
        assert_eq!(
            graph.root_view().expect("root").component_type(),
            &ComponentId::new("App")
        );
    }

    #[test]
    fn owned_module_types_are_per_component() {
        let graph = described_hierarchy();
        let root = graph.root_view().expect("root");
        assert_eq!(
            root.owned_module_types().iter().collect::<Vec<_>>(),
            vec!["ClockModule"]
        );
        let session = &root.subgraphs().expect("subgraphs")[0];
        assert_eq!(
            session.owned_module_types().iter().collect::<Vec<_>>(),
            vec!["SessionModule"]
        );
    }

    #[test]
    fn factory_method_only_on_created_subcomponents() {
        let graph = described_hierarchy();
        let root = graph.root_view().expect("root");
        assert!(root.factory_method().is_none());
        assert!(root.factory_method_parameters().is_empty());

        let session = &root.subgraphs().expect("subgraphs")[0];
        let method = session.factory_method().expect("factory method");
        assert_eq!(method.name, "session");
        let params = session.factory_method_parameters();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "module");
        assert_eq!(params[0].requirement.kind, RequirementKind::Module);
    }

    #[test]
    fn component_requirements_are_per_component() {
        let graph = described_hierarchy();
        let root = graph.root_view().expect("root");
        let app_requirements: Vec<String> = root
            .component_requirements()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(app_requirements, vec!["Config (bound-instance)"]);

        let session = &root.subgraphs().expect("subgraphs")[0];
        let session_requirements: Vec<String> = session
            .component_requirements()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(session_requirements, vec!["SessionModule (module)"]);
    }

    #[test]
    fn component_descriptors_cover_view_and_descendants() {
        let graph = hierarchy();
        let root = graph.root_view().expect("root");
        let all: Vec<String> = root
            .component_descriptors()
            .expect("descriptors")
            .iter()
            .map(|c| c.path.to_string())
            .collect();
        assert_eq!(
            all,
            vec!["App", "App/Session", "App/Session/Screen", "App/Settings"]
        );

        let session = root
            .find(&path("App/Session"))
            .expect("find")
            .expect("present");
        let nested: Vec<String> = session
            .component_descriptors()
            .expect("descriptors")
            .iter()
            .map(|c| c.path.to_string())
            .collect();
        assert_eq!(nested, vec!["App/Session", "App/Session/Screen"]);
    }

    #[test]
    fn unknown_path_is_missing_component_node() {
        let graph = hierarchy();
        assert!(matches!(
            graph.view(&path("App/Ghost")),
            Err(GraphError::MissingComponentNode { .. })
        ));
    }
}
