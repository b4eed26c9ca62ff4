//! Error taxonomy surfaced by repository operations
//!
//! Operations return `anyhow::Result`; the variants below are raised through
//! `anyhow` so callers can `downcast_ref::<RepositoryError>()` to tell the
//! categories apart. Precondition failures (empty index, missing identity)
//! are not errors: they are logged and the operation becomes a no-op.

use crate::artifacts::objects::object_id::ObjectId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("gogit repository already exists in {0}")]
    RepositoryAlreadyExists(PathBuf),

    #[error("not a gogit repository (or any metadata directory found): {0}")]
    NotARepository(PathBuf),

    #[error("a branch named '{0}' already exists")]
    BranchAlreadyExists(String),

    #[error("branch '{0}' does not exist")]
    BranchNotFound(String),

    #[error("invalid branch name: '{0}'")]
    InvalidBranchName(String),

    #[error("cannot delete branch '{0}' checked out at '{1}'")]
    DeleteCurrentBranch(String, PathBuf),

    #[error("object {0} not found")]
    ObjectNotFound(ObjectId),

    #[error("corrupt object {oid}: {reason}")]
    CorruptObject { oid: ObjectId, reason: String },

    #[error("pathspec '{0}' did not match any files")]
    PathNotFound(PathBuf),

    #[error("{message}")]
    CheckoutConflict { paths: Vec<String>, message: String },

    #[error(
        "checkout of '{branch}' failed after the working directory was partially updated: {reason}"
    )]
    PartialCheckout { branch: String, reason: String },
}
