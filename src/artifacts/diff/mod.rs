//! Snapshot comparison
//!
//! Snapshots are flat maps of repository path to blob hash, so comparing two
//! of them is a single ordered merge over their keys.

pub mod tree_diff;
