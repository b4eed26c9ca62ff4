//! Branch switching
//!
//! A checkout compares the current and target snapshots, refuses to run when
//! it would clobber local work, then rewrites the working directory and the
//! index to match the target. Every conflict is found before the first file
//! is touched.

pub mod conflict;
pub mod migration;
