//! # Formats
//!
//! Serialized forms of a [`GlobalGraph`](crate::GlobalGraph).
//!
//! - `SerializableGraph`: the serde-facing snapshot (ids preserved)
//! - Binary persistence: length-prefixed header + postcard payload
//!
//! File I/O lives in the app layer.

mod persistence;
mod snapshot;

pub use persistence::{graph_from_bytes, graph_to_bytes};
pub use snapshot::{SerializableGraph, SerializedEdge, SerializedNode};
