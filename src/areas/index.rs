//! Index (staging area)
//!
//! The index tracks which content goes into the next commit as a mapping of
//! repository-relative path to blob hash. It is read into memory whole,
//! mutated, and rewritten whole.
//!
//! ## Index File Format
//!
//! One line per entry, sorted by path:
//!
//! ```text
//! <40-hex blob hash> <path>
//! ```
//!
//! Paths may contain spaces; only the first space separates the hash.

use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// Suffix of the temporary file the index is written through
const LOCK_SUFFIX: &str = "lock";

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.gogit/index`)
    path: Box<Path>,
    /// Staged blob hashes keyed by path
    entries: BTreeMap<String, ObjectId>,
    /// Whether the in-memory entries differ from what was loaded
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Load the index from disk
    ///
    /// A missing index file is an empty index.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.entries.clear();
        self.changed = false;

        let content = match std::fs::read_to_string(self.path()) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Unable to read index file {}", self.path.display())
                });
            }
        };

        for (line_number, line) in content.lines().enumerate() {
            if line.is_empty() {
                continue;
            }

            let (oid, path) = line.split_once(' ').with_context(|| {
                format!("Corrupt index entry at line {}: {}", line_number + 1, line)
            })?;
            let oid = ObjectId::try_parse(oid.to_string())
                .with_context(|| format!("Corrupt index entry at line {}", line_number + 1))?;

            self.entries.insert(path.to_string(), oid);
        }

        Ok(())
    }

    pub fn entry_by_path(&self, path: &str) -> Option<&ObjectId> {
        self.entries.get(path)
    }

    pub fn is_tracked(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Stage `oid` for `path`; returns whether the entry changed
    pub fn add(&mut self, path: String, oid: ObjectId) -> bool {
        if self.entries.get(&path) == Some(&oid) {
            return false;
        }

        self.entries.insert(path, oid);
        self.changed = true;
        true
    }

    pub fn remove(&mut self, path: &str) -> Option<ObjectId> {
        let removed = self.entries.remove(path);
        if removed.is_some() {
            self.changed = true;
        }
        removed
    }

    /// Replace every entry at once
    pub fn replace_entries(&mut self, entries: BTreeMap<String, ObjectId>) {
        if self.entries != entries {
            self.entries = entries;
            self.changed = true;
        }
    }

    pub fn entries(&self) -> &BTreeMap<String, ObjectId> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tracked paths equal to `prefix` or below it; `""` selects everything
    pub fn entries_under_path(&self, prefix: &str) -> Vec<String> {
        self.entries
            .keys()
            .filter(|path| {
                prefix.is_empty()
                    || path.as_str() == prefix
                    || path
                        .strip_prefix(prefix)
                        .is_some_and(|rest| rest.starts_with('/'))
            })
            .cloned()
            .collect()
    }

    /// Serialize every entry, sorted by path, into the index file
    ///
    /// The content goes to `index.lock` first and is renamed over the index,
    /// so a failed write never leaves a truncated index behind.
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        let lock_path = self.path.with_extension(LOCK_SUFFIX);

        let mut index_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .with_context(|| format!("Unable to open {}", lock_path.display()))?;

        for (path, oid) in &self.entries {
            writeln!(index_file, "{} {}", oid, path)
                .with_context(|| format!("Unable to write {}", lock_path.display()))?;
        }
        index_file.sync_all()?;

        std::fs::rename(&lock_path, &self.path)
            .with_context(|| format!("Unable to replace index {}", self.path.display()))?;
        self.changed = false;

        Ok(())
    }
}
