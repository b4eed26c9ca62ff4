use crate::artifacts::objects::object_id::ObjectId;

#[derive(Debug)]
pub struct ConflictMessage {
    pub header: &'static str,
    pub footer: &'static str,
}

impl From<&ConflictType> for ConflictMessage {
    fn from(value: &ConflictType) -> Self {
        match value {
            ConflictType::StaleFile => Self {
                header: "Your local changes to the following files would be overwritten by checkout:",
                footer: "Please commit your changes or stash them before you switch branches.",
            },
            ConflictType::UntrackedOverwritten => Self {
                header: "The following untracked working tree files would be overwritten by checkout:",
                footer: "Please move or remove them before you switch branches.",
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConflictType {
    /// Tracked file edited since the current commit
    StaleFile,
    /// File unknown to the current commit that the target would replace
    UntrackedOverwritten,
}

impl ConflictType {
    /// Conflict raised by the working copy of a changed path, if any
    ///
    /// `current`, `target` and `working` are the path's blob hashes in the
    /// current snapshot, the target snapshot and the working directory.
    pub fn detect(
        current: Option<&ObjectId>,
        target: Option<&ObjectId>,
        working: Option<&ObjectId>,
    ) -> Option<ConflictType> {
        let working = working?;

        match current {
            Some(current) if target != Some(current) && working != current => {
                Some(ConflictType::StaleFile)
            }
            None if target.is_some_and(|target| target != working) => {
                Some(ConflictType::UntrackedOverwritten)
            }
            _ => None,
        }
    }
}
