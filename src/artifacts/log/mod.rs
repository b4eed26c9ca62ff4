//! Commit history traversal
//!
//! History is a single-parent chain, so walking it is following `parent`
//! links from a starting commit until a root commit.

pub mod rev_list;
