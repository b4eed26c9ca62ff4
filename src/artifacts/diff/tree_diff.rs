use crate::artifacts::objects::object_id::ObjectId;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeChangeType {
    Added(ObjectId),
    Deleted(ObjectId),
    Modified { old: ObjectId, new: ObjectId },
}

impl TreeChangeType {
    pub fn from_entries(old: Option<&ObjectId>, new: Option<&ObjectId>) -> Option<Self> {
        match (old, new) {
            (None, Some(new)) => Some(TreeChangeType::Added(new.clone())),
            (Some(old), None) => Some(TreeChangeType::Deleted(old.clone())),
            (Some(old), Some(new)) if old != new => Some(TreeChangeType::Modified {
                old: old.clone(),
                new: new.clone(),
            }),
            _ => None,
        }
    }

    pub fn old_oid(&self) -> Option<&ObjectId> {
        match self {
            TreeChangeType::Deleted(oid) => Some(oid),
            TreeChangeType::Modified { old, .. } => Some(old),
            TreeChangeType::Added(_) => None,
        }
    }

    pub fn new_oid(&self) -> Option<&ObjectId> {
        match self {
            TreeChangeType::Added(oid) => Some(oid),
            TreeChangeType::Modified { new, .. } => Some(new),
            TreeChangeType::Deleted(_) => None,
        }
    }
}

/// Paths whose blob differs between two snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeDiff {
    changes: BTreeMap<String, TreeChangeType>,
}

impl TreeDiff {
    pub fn between(
        old: &BTreeMap<String, ObjectId>,
        new: &BTreeMap<String, ObjectId>,
    ) -> Self {
        let changes = old
            .keys()
            .chain(new.keys().filter(|path| !old.contains_key(*path)))
            .filter_map(|path| {
                TreeChangeType::from_entries(old.get(path), new.get(path))
                    .map(|change| (path.clone(), change))
            })
            .collect();

        TreeDiff { changes }
    }

    pub fn changes(&self) -> &BTreeMap<String, TreeChangeType> {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
