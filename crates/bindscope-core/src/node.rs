//! # Nodes, Edges and Bindings
//!
//! The closed set of vertex and arc kinds stored in a binding graph.
//!
//! Nodes are immutable value objects compared structurally: two nodes with
//! identical content are the same node, and the builder stores them once.

use crate::{ComponentId, ComponentPath, Key};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// =============================================================================
// BINDINGS
// =============================================================================

/// How a contribution binding produces its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionKind {
    /// A module method that returns the value.
    Provision,
    /// An injectable constructor.
    Injection,
    /// An alias to another key's binding.
    Delegate,
    /// An instance handed to the component creator.
    BoundInstance,
    /// A method on a component dependency.
    ComponentProvision,
    /// The creator of a child subcomponent.
    SubcomponentCreator,
    /// A set assembled from contributions.
    MultiboundSet,
    /// A map assembled from contributions.
    MultiboundMap,
    /// An optional wrapper around another key.
    Optional,
}

impl ContributionKind {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ContributionKind::Provision => "provision",
            ContributionKind::Injection => "injection",
            ContributionKind::Delegate => "delegate",
            ContributionKind::BoundInstance => "bound-instance",
            ContributionKind::ComponentProvision => "component-provision",
            ContributionKind::SubcomponentCreator => "subcomponent-creator",
            ContributionKind::MultiboundSet => "multibound-set",
            ContributionKind::MultiboundMap => "multibound-map",
            ContributionKind::Optional => "optional",
        }
    }
}

/// A binding that satisfies a key by producing a value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContributionBinding {
    pub key: Key,
    pub kind: ContributionKind,
    /// Keys this binding requests, in declaration order.
    #[serde(default)]
    pub dependencies: Vec<Key>,
    pub scope: Option<String>,
    pub contributing_module: Option<String>,
}

impl ContributionBinding {
    #[must_use]
    pub fn new(key: Key, kind: ContributionKind) -> Self {
        Self {
            key,
            kind,
            dependencies: Vec::new(),
            scope: None,
            contributing_module: None,
        }
    }

    #[must_use]
    pub fn with_dependencies(mut self, dependencies: Vec<Key>) -> Self {
        self.dependencies = dependencies;
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    #[must_use]
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.contributing_module = Some(module.into());
        self
    }
}

/// A binding that injects members into an existing instance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MembersInjectionBinding {
    pub key: Key,
    /// Injected member names, in declaration order.
    #[serde(default)]
    pub injection_sites: Vec<String>,
}

impl MembersInjectionBinding {
    #[must_use]
    pub fn new(key: Key, injection_sites: Vec<String>) -> Self {
        Self {
            key,
            injection_sites,
        }
    }
}

/// A declaration of how a key is satisfied.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Binding {
    Contribution(ContributionBinding),
    MembersInjection(MembersInjectionBinding),
}

impl Binding {
    #[must_use]
    pub fn key(&self) -> &Key {
        match self {
            Binding::Contribution(b) => &b.key,
            Binding::MembersInjection(b) => &b.key,
        }
    }

    #[must_use]
    pub fn as_contribution(&self) -> Option<&ContributionBinding> {
        match self {
            Binding::Contribution(b) => Some(b),
            Binding::MembersInjection(_) => None,
        }
    }

    #[must_use]
    pub fn as_members_injection(&self) -> Option<&MembersInjectionBinding> {
        match self {
            Binding::MembersInjection(b) => Some(b),
            Binding::Contribution(_) => None,
        }
    }

    /// Keys this binding depends on. Members injection depends on nothing here.
    #[must_use]
    pub fn dependencies(&self) -> &[Key] {
        match self {
            Binding::Contribution(b) => &b.dependencies,
            Binding::MembersInjection(_) => &[],
        }
    }
}

// =============================================================================
// NODES
// =============================================================================

/// Discriminant of [`Node`], used to classify nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Component,
    Binding,
    MissingBinding,
}

impl NodeKind {
    pub const ALL: [NodeKind; 3] = [
        NodeKind::Component,
        NodeKind::Binding,
        NodeKind::MissingBinding,
    ];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Component => "component",
            NodeKind::Binding => "binding",
            NodeKind::MissingBinding => "missing-binding",
        }
    }
}

/// Where a component gets an instance it cannot construct itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    /// A module instance with non-static provision methods.
    Module,
    /// A component dependency whose methods provide bindings.
    Dependency,
    /// An instance bound directly through the component creator.
    BoundInstance,
}

impl RequirementKind {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            RequirementKind::Module => "module",
            RequirementKind::Dependency => "dependency",
            RequirementKind::BoundInstance => "bound-instance",
        }
    }
}

/// An instance a component needs handed to it when it is created.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComponentRequirement {
    pub kind: RequirementKind,
    pub type_name: String,
}

impl ComponentRequirement {
    #[must_use]
    pub fn new(kind: RequirementKind, type_name: impl Into<String>) -> Self {
        Self {
            kind,
            type_name: type_name.into(),
        }
    }
}

impl fmt::Display for ComponentRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.type_name, self.kind.name())
    }
}

/// One parameter of a child component's factory method.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FactoryMethodParameter {
    pub requirement: ComponentRequirement,
    /// Parameter name as declared.
    pub name: String,
}

/// The method on a parent component that creates a child component.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FactoryMethod {
    pub name: String,
    /// Parameters in declaration order.
    #[serde(default)]
    pub parameters: Vec<FactoryMethodParameter>,
}

/// A component in the hierarchy.
///
/// Whether it is a subcomponent is not stored: it follows from the path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComponentNode {
    pub path: ComponentPath,
    /// False for a module-only root built for full-graph validation.
    #[serde(default = "default_true")]
    pub is_real_component: bool,
    /// Child components in declaration order.
    #[serde(default)]
    pub children: Vec<ComponentId>,
    #[serde(default)]
    pub scopes: BTreeSet<String>,
    /// Module types installed directly in this component.
    #[serde(default)]
    pub owned_modules: BTreeSet<String>,
    #[serde(default)]
    pub component_requirements: BTreeSet<ComponentRequirement>,
    /// Set on children created through a factory method on the parent.
    #[serde(default)]
    pub factory_method: Option<FactoryMethod>,
}

fn default_true() -> bool {
    true
}

impl ComponentNode {
    /// A real component with no children or scopes.
    #[must_use]
    pub fn new(path: ComponentPath) -> Self {
        Self {
            path,
            is_real_component: true,
            children: Vec::new(),
            scopes: BTreeSet::new(),
            owned_modules: BTreeSet::new(),
            component_requirements: BTreeSet::new(),
            factory_method: None,
        }
    }

    /// Every component below the root is a subcomponent.
    #[must_use]
    pub fn is_subcomponent(&self) -> bool {
        !self.path.at_root()
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<ComponentId>) -> Self {
        self.children = children;
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes.insert(scope.into());
        self
    }

    #[must_use]
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.owned_modules.insert(module.into());
        self
    }

    #[must_use]
    pub fn with_requirement(mut self, requirement: ComponentRequirement) -> Self {
        self.component_requirements.insert(requirement);
        self
    }

    #[must_use]
    pub fn with_factory_method(
        mut self,
        name: impl Into<String>,
        parameters: Vec<FactoryMethodParameter>,
    ) -> Self {
        self.factory_method = Some(FactoryMethod {
            name: name.into(),
            parameters,
        });
        self
    }

    /// Paths of the declared children, in declaration order.
    pub fn child_paths(&self) -> impl Iterator<Item = ComponentPath> + '_ {
        self.children.iter().map(|c| self.path.child(c.clone()))
    }
}

/// A binding owned by one component.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BindingNode {
    pub path: ComponentPath,
    pub binding: Binding,
}

impl BindingNode {
    #[must_use]
    pub fn new(path: ComponentPath, binding: Binding) -> Self {
        Self { path, binding }
    }

    #[must_use]
    pub fn key(&self) -> &Key {
        self.binding.key()
    }
}

/// A key requested in a component that nothing satisfies.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MissingBindingNode {
    pub path: ComponentPath,
    pub key: Key,
}

/// A vertex of a binding graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Component(ComponentNode),
    Binding(BindingNode),
    MissingBinding(MissingBindingNode),
}

impl Node {
    /// The path of the component that owns this node.
    #[must_use]
    pub fn component_path(&self) -> &ComponentPath {
        match self {
            Node::Component(n) => &n.path,
            Node::Binding(n) => &n.path,
            Node::MissingBinding(n) => &n.path,
        }
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Component(_) => NodeKind::Component,
            Node::Binding(_) => NodeKind::Binding,
            Node::MissingBinding(_) => NodeKind::MissingBinding,
        }
    }

    #[must_use]
    pub fn as_component(&self) -> Option<&ComponentNode> {
        match self {
            Node::Component(n) => Some(n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_binding(&self) -> Option<&BindingNode> {
        match self {
            Node::Binding(n) => Some(n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_missing_binding(&self) -> Option<&MissingBindingNode> {
        match self {
            Node::MissingBinding(n) => Some(n),
            _ => None,
        }
    }
}

impl From<ComponentNode> for Node {
    fn from(node: ComponentNode) -> Self {
        Node::Component(node)
    }
}

impl From<BindingNode> for Node {
    fn from(node: BindingNode) -> Self {
        Node::Binding(node)
    }
}

impl From<MissingBindingNode> for Node {
    fn from(node: MissingBindingNode) -> Self {
        Node::MissingBinding(node)
    }
}

// =============================================================================
// EDGES
// =============================================================================

/// An arc of a binding graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    /// A request for `request` from a binding or a component entry point.
    Dependency { request: Key, entry_point: bool },
    /// A parent component's factory method for a child component.
    ChildFactoryMethod { factory_method: String },
    /// A subcomponent creator binding to the subcomponent it creates.
    SubcomponentCreatorBinding,
}

impl Edge {
    #[must_use]
    pub fn dependency(request: Key) -> Self {
        Edge::Dependency {
            request,
            entry_point: false,
        }
    }

    #[must_use]
    pub fn entry_point(request: Key) -> Self {
        Edge::Dependency {
            request,
            entry_point: true,
        }
    }

    /// Short label for the variant.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Edge::Dependency {
                entry_point: true, ..
            } => "entry-point",
            Edge::Dependency { .. } => "dependency",
            Edge::ChildFactoryMethod { .. } => "child-factory-method",
            Edge::SubcomponentCreatorBinding => "subcomponent-creator-binding",
        }
    }

    #[must_use]
    pub fn is_dependency(&self) -> bool {
        matches!(self, Edge::Dependency { .. })
    }

    #[must_use]
    pub fn is_entry_point(&self) -> bool {
        matches!(
            self,
            Edge::Dependency {
                entry_point: true,
                ..
            }
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> ComponentPath {
        s.parse().expect("path")
    }

    #[test]
    fn node_owner_and_kind() {
        let binding = Node::from(BindingNode::new(
            path("App/Session"),
            Binding::Contribution(ContributionBinding::new(
                Key::new("Clock"),
                ContributionKind::Provision,
            )),
        ));
        assert_eq!(binding.kind(), NodeKind::Binding);
        assert_eq!(binding.component_path(), &path("App/Session"));
        assert!(binding.as_component().is_none());

        let component = Node::from(ComponentNode::new(path("App")));
        assert_eq!(component.kind(), NodeKind::Component);
        assert!(component.as_binding().is_none());
    }

    #[test]
    fn equal_content_means_equal_nodes() {
        let make = || {
            Node::from(MissingBindingNode {
                path: path("App"),
                key: Key::new("Clock"),
            })
        };
        assert_eq!(make(), make());
    }

    #[test]
    fn component_node_child_paths_follow_declaration_order() {
        let node = ComponentNode::new(path("App")).with_children(vec![
            ComponentId::new("C"),
            ComponentId::new("A"),
            ComponentId::new("B"),
        ]);
        let paths: Vec<String> = node.child_paths().map(|p| p.to_string()).collect();
        assert_eq!(paths, vec!["App/C", "App/A", "App/B"]);
        assert!(!node.is_subcomponent());
        assert!(ComponentNode::new(path("App/C")).is_subcomponent());
    }

    #[test]
    fn subcomponent_flag_follows_path_after_decoding() {
        // No `is_subcomponent` key: the flag cannot disagree with the path.
        let json = r#"{"path":["App","Session"]}"#;
        let node: ComponentNode = serde_json::from_str(json).expect("decode");
        assert!(node.is_subcomponent());
        assert!(node.is_real_component);
        assert!(node.factory_method.is_none());
    }

    #[test]
    fn component_descriptor_builders() {
        let module = ComponentRequirement::new(RequirementKind::Module, "SessionModule");
        let node = ComponentNode::new(path("App/Session"))
            .with_module("SessionModule")
            .with_requirement(module.clone())
            .with_factory_method(
                "session",
                vec![FactoryMethodParameter {
                    requirement: module.clone(),
                    name: "module".to_string(),
                }],
            );

        assert!(node.owned_modules.contains("SessionModule"));
        assert!(node.component_requirements.contains(&module));
        let factory = node.factory_method.as_ref().expect("factory method");
        assert_eq!(factory.name, "session");
        assert_eq!(factory.parameters[0].requirement, module);
        assert_eq!(module.to_string(), "SessionModule (module)");
    }

    #[test]
    fn binding_variant_accessors() {
        let members = Binding::MembersInjection(MembersInjectionBinding::new(
            Key::new("Activity"),
            vec!["presenter".to_string()],
        ));
        assert!(members.as_contribution().is_none());
        assert!(members.as_members_injection().is_some());
        assert!(members.dependencies().is_empty());
        assert_eq!(members.key(), &Key::new("Activity"));
    }

    #[test]
    fn entry_point_edges_are_dependencies() {
        let edge = Edge::entry_point(Key::new("Clock"));
        assert!(edge.is_dependency());
        assert!(edge.is_entry_point());
        assert!(!Edge::dependency(Key::new("Clock")).is_entry_point());
        assert!(!Edge::SubcomponentCreatorBinding.is_dependency());
        assert_eq!(edge.name(), "entry-point");
        assert_eq!(Edge::dependency(Key::new("Clock")).name(), "dependency");
    }
}
