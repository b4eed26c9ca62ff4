//! Concurrent staging
//!
//! `add` is the one operation that does real parallel work: a discovery task
//! walks the requested paths, a pool of workers hashes and stores file
//! content, and a single collector folds the results into the index map.
//!
//! ```text
//! discovery --(paths, bounded)--> workers x N --(results, bounded)--> collector
//! ```
//!
//! Workers never touch the index; the collector is its only writer.

pub mod pipeline;

/// Default number of staging workers
pub const DEFAULT_WORKERS: usize = 4;

/// Default capacity of the path and result queues
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;
