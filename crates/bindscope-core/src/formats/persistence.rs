//! # Persistence Format
//!
//! Binary serialization for global graphs.
//!
//! Layout, all before the postcard-encoded `SerializableGraph`:
//! - bytes 0..4: magic (`BSCP`)
//! - byte 4: format version
//! - bytes 5..9: payload length, `u32` little endian
//!
//! The declared length must match the bytes that follow exactly, so a
//! truncated or padded file is rejected before postcard sees it.

use super::SerializableGraph;
use crate::primitives::{FORMAT_VERSION, HEADER_LEN, MAGIC_BYTES, MAX_PERSISTENCE_PAYLOAD_SIZE};
use crate::{GlobalGraph, GraphError};

const VERSION_OFFSET: usize = 4;
const LENGTH_OFFSET: usize = 5;

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

/// Serialize a graph to bytes (header + payload).
pub fn graph_to_bytes(graph: &GlobalGraph) -> Result<Vec<u8>, GraphError> {
    let payload = postcard::to_stdvec(&SerializableGraph::from(graph))
        .map_err(|e| GraphError::SerializationError(e.to_string()))?;

    let declared = u32::try_from(payload.len())
        .ok()
        .filter(|len| *len as usize <= MAX_PERSISTENCE_PAYLOAD_SIZE)
        .ok_or_else(|| {
            GraphError::SerializationError(format!(
                "Payload of {} bytes exceeds maximum allowed {} bytes",
                payload.len(),
                MAX_PERSISTENCE_PAYLOAD_SIZE
            ))
        })?;

    let mut result = Vec::with_capacity(HEADER_LEN + payload.len());
    result.extend_from_slice(MAGIC_BYTES);
    result.push(FORMAT_VERSION);
    result.extend_from_slice(&declared.to_le_bytes());
    result.extend_from_slice(&payload);
    Ok(result)
}

/// Deserialize and validate a graph from bytes.
pub fn graph_from_bytes(bytes: &[u8]) -> Result<GlobalGraph, GraphError> {
    let payload = checked_payload(bytes)?;

    let serializable: SerializableGraph = postcard::from_bytes(payload)
        .map_err(|e| GraphError::DeserializationError(format!("Failed to decode graph: {}", e)))?;

    GlobalGraph::try_from(serializable)
}

/// The payload slice after the header, once magic, version and declared
/// length have all been checked.
fn checked_payload(bytes: &[u8]) -> Result<&[u8], GraphError> {
    let Some((header, payload)) = bytes.split_at_checked(HEADER_LEN) else {
        return Err(GraphError::DeserializationError(format!(
            "Input of {} bytes is shorter than the {} byte header",
            bytes.len(),
            HEADER_LEN
        )));
    };

    if !header.starts_with(MAGIC_BYTES) {
        return Err(GraphError::DeserializationError(
            "Invalid magic bytes".to_string(),
        ));
    }
    if header[VERSION_OFFSET] != FORMAT_VERSION {
        return Err(GraphError::DeserializationError(format!(
            "Unsupported version: {} (expected {})",
            header[VERSION_OFFSET], FORMAT_VERSION
        )));
    }

    let mut length = [0u8; 4];
    length.copy_from_slice(&header[LENGTH_OFFSET..HEADER_LEN]);
    let declared = u32::from_le_bytes(length) as usize;

    if declared > MAX_PERSISTENCE_PAYLOAD_SIZE {
        return Err(GraphError::DeserializationError(format!(
            "Declared payload of {} bytes exceeds maximum allowed {} bytes",
            declared, MAX_PERSISTENCE_PAYLOAD_SIZE
        )));
    }
    if declared != payload.len() {
        return Err(GraphError::DeserializationError(format!(
            "Payload length mismatch: header declares {} bytes, found {}",
            declared,
            payload.len()
        )));
    }
    Ok(payload)
}

// =============================================================================
// TESTS
// =============================================================================
