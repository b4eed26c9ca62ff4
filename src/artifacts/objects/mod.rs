//! Object types and operations
//!
//! Every piece of stored content is an object identified by its SHA-1 hash:
//!
//! - **Blob**: File content (raw bytes)
//! - **Tree**: Flattened snapshot mapping repository paths to blob hashes
//! - **Commit**: Snapshot metadata (tree, parent, author, date, message)
//!
//! All objects share the on-disk format `<type> <size>\0<content>`, and the
//! hash is taken over that whole byte sequence.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Byte separating an object's header from its payload
pub const OBJECT_HEADER_SEPARATOR: u8 = b'\0';
