use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::diff::tree_diff::{TreeChangeType, TreeDiff};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::file_change::{IndexChangeType, WorkspaceChangeType};
use std::collections::{BTreeMap, BTreeSet};

pub type Snapshot = BTreeMap<String, ObjectId>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    pub branch: BranchName,
    /// Index vs HEAD tree
    pub staged: BTreeMap<String, IndexChangeType>,
    /// Working directory vs index
    pub unstaged: BTreeMap<String, WorkspaceChangeType>,
    /// Working files the index does not know
    pub untracked: BTreeSet<String>,
}

impl StatusInfo {
    pub fn compute(
        branch: BranchName,
        head: &Snapshot,
        index: &Snapshot,
        working: &Snapshot,
    ) -> Self {
        let staged = TreeDiff::between(head, index)
            .changes()
            .iter()
            .map(|(path, change)| {
                let change = match change {
                    TreeChangeType::Added(_) => IndexChangeType::Added,
                    TreeChangeType::Modified { .. } => IndexChangeType::Modified,
                    TreeChangeType::Deleted(_) => IndexChangeType::Deleted,
                };
                (path.clone(), change)
            })
            .collect();

        let unstaged = index
            .iter()
            .filter_map(|(path, oid)| match working.get(path) {
                None => Some((path.clone(), WorkspaceChangeType::Deleted)),
                Some(working_oid) if working_oid != oid => {
                    Some((path.clone(), WorkspaceChangeType::Modified))
                }
                Some(_) => None,
            })
            .collect();

        let untracked = working
            .keys()
            .filter(|path| !index.contains_key(*path))
            .cloned()
            .collect();

        StatusInfo {
            branch,
            staged,
            unstaged,
            untracked,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.staged.is_empty() && self.unstaged.is_empty() && self.untracked.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn oid(seed: char) -> ObjectId {
        ObjectId::try_parse(seed.to_string().repeat(40)).unwrap()
    }

    fn snapshot(entries: &[(&str, char)]) -> Snapshot {
        entries
            .iter()
            .map(|(path, seed)| (path.to_string(), oid(*seed)))
            .collect()
    }

    #[test]
    fn separates_staged_unstaged_and_untracked() {
        let head = snapshot(&[("kept", '1'), ("edited", '2'), ("removed", '3')]);
        let index = snapshot(&[("kept", '1'), ("edited", '4'), ("added", '5')]);
        let working = snapshot(&[("kept", '6'), ("edited", '4'), ("scratch", '7')]);

        let status = StatusInfo::compute(
            BranchName::try_parse("main".to_string()).unwrap(),
            &head,
            &index,
            &working,
        );

        assert_eq!(
            status.staged,
            BTreeMap::from([
                ("added".to_string(), IndexChangeType::Added),
                ("edited".to_string(), IndexChangeType::Modified),
                ("removed".to_string(), IndexChangeType::Deleted),
            ])
        );
        assert_eq!(
            status.unstaged,
            BTreeMap::from([
                ("added".to_string(), WorkspaceChangeType::Deleted),
                ("kept".to_string(), WorkspaceChangeType::Modified),
            ])
        );
        assert_eq!(status.untracked, BTreeSet::from(["scratch".to_string()]));
        assert!(!status.is_clean());
    }

    #[test]
    fn matching_snapshots_are_clean() {
        let tree = snapshot(&[("a", '1')]);

        let status = StatusInfo::compute(BranchName::default(), &tree, &tree, &tree);

        assert!(status.is_clean());
    }
}
