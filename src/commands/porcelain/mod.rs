//! Porcelain commands (user-facing operations)
//!
//! ## Commands
//!
//! - `init`: Initialize a new repository
//! - `add`: Stage files for commit
//! - `commit`: Create a new commit
//! - `status`: Show working tree status
//! - `log`: Show commit history
//! - `branch`: Create, list, or delete branches
//! - `checkout`: Switch branches
//! - `config`: Read or set the author identity

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod config;
pub mod init;
pub mod log;
pub mod status;
