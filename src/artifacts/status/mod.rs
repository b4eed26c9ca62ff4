//! Working tree status
//!
//! Status compares three snapshots: the HEAD tree, the index, and the
//! working directory.
//!
//! - `file_change`: Change kinds and their labels
//! - `status_info`: The comparison itself

pub mod file_change;
pub mod status_info;
