//! # bindscope-core
//!
//! The dependency-binding graph engine for bindscope - THE ENGINE.
//!
//! Given one immutable global graph describing every binding across a tree
//! of nested components, this crate derives for any component the exact
//! sub-graph visible to it, plus indexed lookups from a dependency key to
//! the binding that satisfies it.
//!
//! ## Visibility Rule
//!
//! A node is in the view of the component at path `p` iff it is reachable
//! from `p`'s component node and its owner path has `p` as a prefix.
//!
//! ## Architectural Constraints
//!
//! - The global graph is built once and never mutated
//! - Views borrow the global graph; a view never refers to its parent
//! - Every derived value is computed at most once per view
//! - No async, no I/O, no panics: contract violations are `GraphError`s

// =============================================================================
// MODULES
// =============================================================================

pub mod formats;
pub mod graph;
pub mod network;
pub mod node;
pub mod primitives;
pub mod types;
pub mod view;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{ComponentId, ComponentPath, EdgeId, GraphError, Key, NodeId};

// =============================================================================
// RE-EXPORTS: Graph Engine
// =============================================================================

pub use graph::{BindingNetwork, EdgeRef, GlobalGraph, GlobalGraphBuilder};
pub use network::{EndpointPair, Network};
pub use node::{
    Binding, BindingNode, ComponentNode, ComponentRequirement, ContributionBinding,
    ContributionKind, Edge, FactoryMethod, FactoryMethodParameter, MembersInjectionBinding,
    MissingBindingNode, Node, NodeKind, RequirementKind,
};
pub use view::ComponentView;

// =============================================================================
// RE-EXPORTS: Formats
// =============================================================================

pub use formats::{SerializableGraph, graph_from_bytes, graph_to_bytes};
