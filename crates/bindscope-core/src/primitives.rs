//! # Engine Primitives
//!
//! Fixed constants for the bindscope engine and its persistence format.

/// Separator used when rendering or parsing a component path (`App/Session`).
pub const PATH_SEPARATOR: char = '/';

/// Magic bytes for the bindscope binary graph header.
///
/// - File Header = Magic Bytes ("BSCP") + Version (u8) + payload length
///   (u32, little endian) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"BSCP";

/// Current serialization format version.
///
/// Increment this when making breaking changes to the serialization format.
pub const FORMAT_VERSION: u8 = 2;

/// Length of the binary header (magic + version + payload length).
pub const HEADER_LEN: usize = 9;

/// Maximum allowed payload size for the binary format (256 MB).
///
/// Checked before any decoding is attempted.
pub const MAX_PERSISTENCE_PAYLOAD_SIZE: usize = 256 * 1024 * 1024;
