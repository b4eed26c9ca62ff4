use colored::Colorize;

const LABEL_WIDTH: usize = 8;

/// Index entry compared with the HEAD tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IndexChangeType {
    Added,
    Modified,
    Deleted,
}

impl IndexChangeType {
    pub fn label(&self) -> &'static str {
        match self {
            IndexChangeType::Added => "new file:   ",
            IndexChangeType::Modified => "modified:   ",
            IndexChangeType::Deleted => "deleted:    ",
        }
    }
}

/// Working file compared with its index entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WorkspaceChangeType {
    Modified,
    Deleted,
}

impl WorkspaceChangeType {
    pub fn label(&self) -> &'static str {
        match self {
            WorkspaceChangeType::Modified => "modified:   ",
            WorkspaceChangeType::Deleted => "deleted:    ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileChangeType {
    Workspace(WorkspaceChangeType),
    Index(IndexChangeType),
}

impl std::fmt::Display for FileChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let colored_str = match self {
            FileChangeType::Workspace(change) => change.label().red(),
            FileChangeType::Index(change) => change.label().green(),
        };
        write!(f, "{:>width$}{}", "", colored_str, width = LABEL_WIDTH)
    }
}
