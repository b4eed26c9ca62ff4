//! Plumbing commands (low-level object access)
//!
//! ## Commands
//!
//! - `hash-object`: Compute a blob ID and optionally store it
//! - `cat-file`: Print an object's payload
//! - `ls-tree`: List the entries of a tree

pub mod cat_file;
pub mod hash_object;
pub mod ls_tree;
