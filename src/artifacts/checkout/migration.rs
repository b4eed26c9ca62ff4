//! Checkout migration
//!
//! 1. Diff the current snapshot against the target snapshot
//! 2. Check each changed path against the working directory
//! 3. Load every blob the target needs
//! 4. Delete, then write, working files
//! 5. Bring the index in line with what was written
//!
//! Steps 1 to 3 never touch the filesystem, so a conflict or a missing blob
//! leaves the working directory as it was. A failure in step 4 is reported
//! as a partial checkout.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::workspace::Workspace;
use crate::artifacts::checkout::conflict::{ConflictMessage, ConflictType};
use crate::artifacts::diff::tree_diff::{TreeChangeType, TreeDiff};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use bytes::Bytes;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Detected conflicts grouped by type
pub type ConflictsSet = BTreeMap<ConflictType, Vec<String>>;

pub struct Migration<'r> {
    database: &'r Database,
    workspace: &'r Workspace,
    tree_diff: TreeDiff,
    conflicts: ConflictsSet,
    /// Paths removed from the working directory
    deletions: Vec<String>,
    /// Paths written with the target's blob
    writes: Vec<(String, ObjectId)>,
}

impl<'r> Migration<'r> {
    pub fn new(
        database: &'r Database,
        workspace: &'r Workspace,
        current: &BTreeMap<String, ObjectId>,
        target: &BTreeMap<String, ObjectId>,
    ) -> Self {
        Self {
            database,
            workspace,
            tree_diff: TreeDiff::between(current, target),
            conflicts: ConflictsSet::new(),
            deletions: Vec::new(),
            writes: Vec::new(),
        }
    }

    /// Record the actions the diff calls for and the conflicts `working`
    /// raises against them
    ///
    /// `working` is the blob hash of every file in the working directory.
    pub fn plan_changes(&mut self, working: &BTreeMap<String, ObjectId>) -> anyhow::Result<()> {
        for (path, change) in self.tree_diff.changes() {
            if let Some(conflict) =
                ConflictType::detect(change.old_oid(), change.new_oid(), working.get(path))
            {
                self.conflicts
                    .entry(conflict)
                    .or_default()
                    .push(path.clone());
            }

            match change {
                TreeChangeType::Deleted(_) => self.deletions.push(path.clone()),
                TreeChangeType::Added(new) | TreeChangeType::Modified { new, .. } => {
                    self.writes.push((path.clone(), new.clone()))
                }
            }
        }

        let errors = self.collect_errors();

        if !errors.is_empty() {
            let paths = self.conflicts.values().flatten().cloned().collect();
            let errors = errors
                .iter()
                .map(|e| format!("error: {}", e))
                .collect::<Vec<_>>()
                .join("\n\n");

            return Err(RepositoryError::CheckoutConflict {
                paths,
                message: format!("{}\n\nAborting", errors),
            }
            .into());
        }

        debug!(
            deletions = self.deletions.len(),
            writes = self.writes.len(),
            "planned checkout"
        );

        Ok(())
    }

    fn collect_errors(&self) -> Vec<String> {
        self.conflicts
            .iter()
            .filter(|(_, paths)| !paths.is_empty())
            .map(|(conflict_type, paths)| {
                let paths = paths
                    .iter()
                    .map(|p| format!("\t{}", p))
                    .collect::<Vec<String>>();

                let ConflictMessage { header, footer } = conflict_type.into();
                format!("{}\n{}\n{}", header, paths.join("\n"), footer)
            })
            .collect::<Vec<_>>()
    }

    /// Blob content for every planned write
    pub fn load_blobs(&self) -> anyhow::Result<Vec<(String, Bytes)>> {
        self.writes
            .iter()
            .map(|(path, oid)| {
                let blob = self.database.parse_object_as_blob(oid)?.ok_or_else(|| {
                    RepositoryError::CorruptObject {
                        oid: oid.clone(),
                        reason: format!("expected a blob for {}", path),
                    }
                })?;

                Ok((path.clone(), blob.into_content()))
            })
            .collect()
    }

    /// Rewrite the working directory and the index to the target snapshot
    ///
    /// Must follow a successful `plan_changes`.
    pub fn apply_changes(&self, branch: &str, index: &mut Index) -> anyhow::Result<()> {
        let blobs = self.load_blobs()?;

        self.update_workspace(&blobs)
            .map_err(|err| RepositoryError::PartialCheckout {
                branch: branch.to_string(),
                reason: format!("{:#}", err),
            })?;
        self.update_index(index);

        info!(
            branch,
            deleted = self.deletions.len(),
            written = self.writes.len(),
            "checked out"
        );

        Ok(())
    }

    fn update_workspace(&self, blobs: &[(String, Bytes)]) -> anyhow::Result<()> {
        for path in &self.deletions {
            self.workspace.remove_file(path)?;
        }

        for (path, content) in blobs {
            self.workspace.write_file(path, content)?;
        }

        Ok(())
    }

    fn update_index(&self, index: &mut Index) {
        for path in &self.deletions {
            index.remove(path);
        }

        for (path, oid) in &self.writes {
            index.add(path.clone(), oid.clone());
        }
    }
}
