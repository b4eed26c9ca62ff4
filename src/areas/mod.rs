//! Repository storage areas
//!
//! - `config`: User identity (global TOML config, in-memory store)
//! - `database`: Content-addressable object store
//! - `index`: Staging area mapping paths to blob hashes
//! - `refs`: HEAD and branch refs
//! - `repository`: Owner of every area, built from a `RepositoryConfig`
//! - `workspace`: Working directory walking and file access

pub mod config;
pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
