//! # Core Type Definitions
//!
//! This module contains the value types shared by every part of the engine:
//! - Graph identifiers (`NodeId`, `EdgeId`)
//! - Component addressing (`ComponentId`, `ComponentPath`)
//! - Dependency identifiers (`Key`)
//! - Error types (`GraphError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`
//! - Compare structurally; two values with identical content are the same value
//! - Are immutable once constructed

use crate::primitives::PATH_SEPARATOR;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// GRAPH IDENTIFIERS
// =============================================================================

/// Identifier of a node inside one global graph.
///
/// Ids are assigned by the builder in insertion order and are only
/// meaningful relative to the graph that assigned them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Identifier of an edge inside one global graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

// =============================================================================
// COMPONENT ADDRESSING
// =============================================================================

/// Identifier of a single component, usually its fully qualified type name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The root-to-here chain of component identifiers addressing one component.
///
/// A path is never empty. The identifier at index `i` is the ancestor at
/// depth `i`, so every prefix of a path is itself the path of an ancestor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<ComponentId>", into = "Vec<ComponentId>")]
pub struct ComponentPath(Vec<ComponentId>);

impl ComponentPath {
    /// Path of a root component.
    #[must_use]
    pub fn root(component: ComponentId) -> Self {
        Self(vec![component])
    }

    /// Returns a new path with `component` appended. The receiver is unchanged.
    #[must_use]
    pub fn child(&self, component: ComponentId) -> Self {
        let mut components = Vec::with_capacity(self.0.len().saturating_add(1));
        components.extend_from_slice(&self.0);
        components.push(component);
        Self(components)
    }

    /// True iff `candidate` is this path or the path of one of its descendants.
    #[must_use]
    pub fn is_prefix_of(&self, candidate: &ComponentPath) -> bool {
        candidate.0.starts_with(&self.0)
    }

    /// The parent path, or `None` for a root path.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.at_root() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// The component this path addresses (the last identifier).
    #[must_use]
    pub fn current_component(&self) -> &ComponentId {
        &self.0[self.0.len() - 1]
    }

    #[must_use]
    pub fn root_component(&self) -> &ComponentId {
        &self.0[0]
    }

    #[must_use]
    pub fn at_root(&self) -> bool {
        self.0.len() == 1
    }

    /// Number of identifiers; always at least one.
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn components(&self) -> &[ComponentId] {
        &self.0
    }
}

impl TryFrom<Vec<ComponentId>> for ComponentPath {
    type Error = GraphError;

    fn try_from(components: Vec<ComponentId>) -> Result<Self, Self::Error> {
        if components.is_empty() {
            return Err(GraphError::EmptyComponentPath);
        }
        Ok(Self(components))
    }
}

impl From<ComponentPath> for Vec<ComponentId> {
    fn from(path: ComponentPath) -> Self {
        path.0
    }
}

impl fmt::Display for ComponentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", PATH_SEPARATOR)?;
            }
            write!(f, "{}", component)?;
        }
        Ok(())
    }
}

impl FromStr for ComponentPath {
    type Err = GraphError;

    /// Parses the `Root/Child/Grandchild` rendering produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(GraphError::EmptyComponentPath);
        }
        let mut components = Vec::new();
        for segment in trimmed.split(PATH_SEPARATOR) {
            let segment = segment.trim();
            if segment.is_empty() {
                return Err(GraphError::InvalidComponentPath(s.to_string()));
            }
            components.push(ComponentId::new(segment));
        }
        Self::try_from(components)
    }
}

// =============================================================================
// KEY
// =============================================================================

/// Identifies "a dependency of a given type and optional qualifier".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Key {
    /// The qualifier annotation, if any.
    pub qualifier: Option<String>,
    /// The requested type.
    pub type_name: String,
}

impl Key {
    /// An unqualified key.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            qualifier: None,
            type_name: type_name.into(),
        }
    }

    #[must_use]
    pub fn qualified(qualifier: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            qualifier: Some(qualifier.into()),
            type_name: type_name.into(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(qualifier) => write!(f, "@{} {}", qualifier, self.type_name),
            None => f.write_str(&self.type_name),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in bindscope.
///
/// The query variants (`MissingComponentNode`, `MissingBinding`,
/// `AmbiguousBinding`, `AmbiguousOptionalBinding`) mean an upstream contract
/// was already broken: they are returned at the call site with the path and
/// key involved and are never retried or papered over.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A component path must contain at least one component.
    #[error("Component path must not be empty")]
    EmptyComponentPath,

    /// A textual component path could not be parsed.
    #[error("Invalid component path: {0:?}")]
    InvalidComponentPath(String),

    /// No component node owns exactly this path.
    #[error("No component node for path {path}")]
    MissingComponentNode { path: ComponentPath },

    /// `contribution_binding` found no contribution binding for the key.
    #[error("No contribution binding for {key} in component {path}")]
    MissingBinding { path: ComponentPath, key: Key },

    /// `contribution_binding` found more than one contribution binding.
    #[error("{count} contribution bindings for {key} in component {path}, expected exactly one")]
    AmbiguousBinding {
        path: ComponentPath,
        key: Key,
        count: usize,
    },

    /// `members_injection_binding` found more than one members-injection binding.
    #[error("{count} members-injection bindings for {key} in component {path}, expected at most one")]
    AmbiguousOptionalBinding {
        path: ComponentPath,
        key: Key,
        count: usize,
    },

    /// An edge refers to a node that was never added.
    #[error("Edge references unknown node: {source_node:?} -> {target_node:?}")]
    DanglingEdge {
        source_node: NodeId,
        target_node: NodeId,
    },

    /// Two different component nodes claim the same path.
    #[error("More than one component node for path {path}")]
    DuplicateComponentNode { path: ComponentPath },

    /// A subcomponent node whose parent does not list it as a child.
    #[error("Component {path} is not declared as a child of its parent")]
    UndeclaredComponent { path: ComponentPath },

    /// A component lists the same child more than once.
    #[error("Child {path} is declared more than once by its parent")]
    DuplicateChildDeclaration { path: ComponentPath },

    /// The graph has no component node with a length-one path.
    #[error("Graph has no root component node")]
    MissingRootComponent,

    /// The graph has more than one component node with a length-one path.
    #[error("Graph has {} root component nodes", roots.len())]
    MultipleRootComponents { roots: Vec<ComponentPath> },

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
