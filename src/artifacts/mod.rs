//! Version control data structures and algorithms
//!
//! - `branch`: Branch names and symbolic ref names
//! - `checkout`: Branch switching and conflict detection
//! - `diff`: Snapshot comparison
//! - `ignore`: Ignore predicates and `.gogitignore` rules
//! - `log`: Commit history traversal
//! - `objects`: Object types (blob, tree, commit)
//! - `staging`: Concurrent discovery, hashing, and storing of files
//! - `status`: Working tree status

pub mod branch;
pub mod checkout;
pub mod diff;
pub mod ignore;
pub mod log;
pub mod objects;
pub mod staging;
pub mod status;
