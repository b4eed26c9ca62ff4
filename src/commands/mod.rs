//! Command implementations
//!
//! - `plumbing`: Low-level object commands (hash-object, cat-file, ls-tree)
//! - `porcelain`: User-facing workflows (add, commit, log, checkout, ...)
//!
//! Each command is an `impl Repository` block writing its output to the
//! repository's writer.

pub mod plumbing;
pub mod porcelain;
