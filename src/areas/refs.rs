//! References (HEAD and branches)
//!
//! ## File Format
//!
//! - `HEAD` holds `ref: refs/heads/<branch>\n`
//! - `refs/heads/<branch>` holds `<40-hex commit hash>\n`, or is empty while
//!   the branch has no commits yet
//!
//! Writes take an exclusive lock on the ref file for the duration of the write.

use crate::artifacts::branch::branch_name::{BranchName, SymRefName};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Clone, new)]
pub struct Refs {
    /// Path to the metadata directory (typically `.gogit`)
    path: Box<Path>,
}

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

/// Branch HEAD points at in a fresh repository
pub const DEFAULT_BRANCH: &str = "main";

#[derive(Debug, Clone)]
enum SymRefOrOid {
    SymRef { sym_ref_name: SymRefName },
    Oid(ObjectId),
}

impl SymRefOrOid {
    fn read_symref_or_oid(path: &Path) -> anyhow::Result<Option<SymRefOrOid>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read ref file at {:?}", path))?;
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        let symref_match = regex::Regex::new(SYMREF_REGEX)?.captures(content);
        if let Some(symref_match) = symref_match {
            Ok(Some(SymRefOrOid::SymRef {
                sym_ref_name: SymRefName::new(symref_match[1].to_string()),
            }))
        } else {
            Ok(Some(SymRefOrOid::Oid(ObjectId::try_parse(
                content.to_string(),
            )?)))
        }
    }
}

impl Refs {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `HEAD` and an unborn default branch
    pub fn initialize(&self) -> anyhow::Result<()> {
        let default_branch = BranchName::try_parse(DEFAULT_BRANCH.to_string())?;

        self.update_ref_file(self.branch_path(&default_branch), String::new())?;
        self.set_head(&default_branch)
    }

    /// The branch ref `HEAD` points at
    ///
    /// `HEAD` must be symbolic; a detached `HEAD` is not supported.
    pub fn current_ref(&self) -> anyhow::Result<SymRefName> {
        match SymRefOrOid::read_symref_or_oid(&self.head_path())? {
            Some(SymRefOrOid::SymRef { sym_ref_name }) => Ok(sym_ref_name),
            Some(SymRefOrOid::Oid(oid)) => {
                anyhow::bail!("HEAD is detached at {}, expected a branch ref", oid)
            }
            None => anyhow::bail!("HEAD is missing or empty at {:?}", self.head_path()),
        }
    }

    pub fn current_branch(&self) -> anyhow::Result<BranchName> {
        BranchName::try_parse_sym_ref_name(&self.current_ref()?)
    }

    pub fn is_current_branch(&self, branch_name: &BranchName) -> anyhow::Result<bool> {
        Ok(branch_name == &self.current_branch()?)
    }

    /// Commit the current branch points at; `None` while the branch is unborn
    pub fn read_head(&self) -> anyhow::Result<Option<ObjectId>> {
        let current_ref = self.current_ref()?;
        self.read_ref_path(&self.path.join(current_ref.as_ref_path()))
    }

    /// Move the current branch to `oid`
    pub fn update_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        let current_ref = self.current_ref()?;
        let ref_path = self.path.join(current_ref.as_ref_path()).into_boxed_path();

        self.update_ref_file(ref_path, format!("{}\n", oid))?;
        debug!(branch = %current_ref, %oid, "moved branch");

        Ok(())
    }

    /// Point `HEAD` at `branch_name`
    pub fn set_head(&self, branch_name: &BranchName) -> anyhow::Result<()> {
        self.update_ref_file(
            self.head_path(),
            format!("ref: {}\n", branch_name.to_sym_ref_name()),
        )
    }

    pub fn branch_exists(&self, branch_name: &BranchName) -> bool {
        self.branch_path(branch_name).is_file()
    }

    /// Commit a branch points at
    ///
    /// Fails with `BranchNotFound` when there is no ref file for the branch.
    pub fn read_ref(&self, branch_name: &BranchName) -> anyhow::Result<Option<ObjectId>> {
        let ref_path = self.branch_path(branch_name);

        if !ref_path.is_file() {
            return Err(RepositoryError::BranchNotFound(branch_name.to_string()).into());
        }

        self.read_ref_path(&ref_path)
    }

    fn read_ref_path(&self, path: &Path) -> anyhow::Result<Option<ObjectId>> {
        match SymRefOrOid::read_symref_or_oid(path)? {
            Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
            Some(SymRefOrOid::SymRef { sym_ref_name }) => {
                anyhow::bail!("nested symbolic ref to {} at {:?}", sym_ref_name, path)
            }
            None => Ok(None),
        }
    }

    pub fn update_ref_file(&self, path: Box<Path>, raw_ref: String) -> anyhow::Result<()> {
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!(
                "failed to create parent directories for ref file at {:?}",
                path
            )
        })?)?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path.clone())
            .with_context(|| format!("failed to open ref file at {:?}", path))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut()
            .write_all(raw_ref.as_bytes())
            .with_context(|| format!("failed to write ref file at {:?}", path))?;

        Ok(())
    }

    /// Create a branch at `source_oid`, or unborn when there is no commit yet
    pub fn create_branch(
        &self,
        name: &BranchName,
        source_oid: Option<&ObjectId>,
    ) -> anyhow::Result<()> {
        if self.branch_exists(name) {
            return Err(RepositoryError::BranchAlreadyExists(name.to_string()).into());
        }

        let raw_ref = source_oid
            .map(|oid| format!("{}\n", oid))
            .unwrap_or_default();
        self.update_ref_file(self.branch_path(name), raw_ref)
    }

    /// Remove a branch ref and return the commit it pointed at
    pub fn delete_branch(&self, name: &BranchName) -> anyhow::Result<Option<ObjectId>> {
        let branch_path = self.branch_path(name);
        let oid = self.read_ref(name)?;

        std::fs::remove_file(branch_path.as_ref())
            .with_context(|| format!("failed to delete branch file at {:?}", branch_path))?;
        self.prune_branch_empty_parent_dirs(branch_path.as_ref())?;

        Ok(oid)
    }

    /// Every branch under `refs/heads`, sorted by name
    pub fn list_branches(&self) -> anyhow::Result<Vec<BranchName>> {
        let heads_path = self.heads_path();

        let mut branches = WalkDir::new(&heads_path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let relative_path = entry.path().strip_prefix(heads_path.as_ref()).ok()?;
                let name = relative_path
                    .components()
                    .map(|component| component.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                BranchName::try_parse(name).ok()
            })
            .collect::<Vec<_>>();
        branches.sort();

        Ok(branches)
    }

    fn prune_branch_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.heads_path().as_ref()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent).with_context(|| {
                format!("failed to remove empty branch directory at {:?}", parent)
            })?;
            self.prune_branch_empty_parent_dirs(parent)?;
        }

        Ok(())
    }

    pub fn branch_path(&self, branch_name: &BranchName) -> Box<Path> {
        self.heads_path()
            .join(branch_name.as_ref())
            .into_boxed_path()
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn refs_path(&self) -> Box<Path> {
        self.path.join("refs").into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.refs_path().join("heads").into_boxed_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn refs() -> (TempDir, Refs) {
        let dir = TempDir::new().unwrap();
        let refs = Refs::new(dir.path().join(".gogit").into_boxed_path());
        refs.initialize().unwrap();
        (dir, refs)
    }

    fn branch(name: &str) -> BranchName {
        BranchName::try_parse(name.to_string()).unwrap()
    }

    fn oid(seed: char) -> ObjectId {
        ObjectId::try_parse(seed.to_string().repeat(40)).unwrap()
    }

    #[rstest]
    fn fresh_head_points_at_unborn_main(refs: (TempDir, Refs)) {
        let (_dir, refs) = refs;

        assert_eq!(
            std::fs::read_to_string(refs.head_path()).unwrap(),
            "ref: refs/heads/main\n"
        );
        assert_eq!(refs.current_branch().unwrap(), branch("main"));
        assert_eq!(refs.read_head().unwrap(), None);
        assert_eq!(refs.list_branches().unwrap(), vec![branch("main")]);
    }

    #[rstest]
    fn update_head_moves_current_branch(refs: (TempDir, Refs)) {
        let (_dir, refs) = refs;

        refs.update_head(&oid('a')).unwrap();

        assert_eq!(
            std::fs::read_to_string(refs.branch_path(&branch("main"))).unwrap(),
            format!("{}\n", oid('a'))
        );
        assert_eq!(refs.read_head().unwrap(), Some(oid('a')));
    }

    #[rstest]
    fn duplicate_branch_is_rejected(refs: (TempDir, Refs)) {
        let (_dir, refs) = refs;
        refs.create_branch(&branch("dev"), Some(&oid('b'))).unwrap();

        let err = refs
            .create_branch(&branch("dev"), Some(&oid('c')))
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RepositoryError>(),
            Some(RepositoryError::BranchAlreadyExists(name)) if name == "dev"
        ));
        assert_eq!(refs.read_ref(&branch("dev")).unwrap(), Some(oid('b')));
    }

    #[rstest]
    fn nested_branches_are_listed_and_pruned(refs: (TempDir, Refs)) {
        let (_dir, refs) = refs;
        refs.update_head(&oid('a')).unwrap();
        refs.create_branch(&branch("feature/login"), Some(&oid('a')))
            .unwrap();

        assert_eq!(
            refs.list_branches().unwrap(),
            vec![branch("feature/login"), branch("main")]
        );

        refs.delete_branch(&branch("feature/login")).unwrap();

        assert!(!refs.heads_path().join("feature").exists());
        assert_eq!(refs.list_branches().unwrap(), vec![branch("main")]);
    }

    #[rstest]
    fn reading_missing_branch_fails(refs: (TempDir, Refs)) {
        let (_dir, refs) = refs;

        let err = refs.read_ref(&branch("ghost")).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RepositoryError>(),
            Some(RepositoryError::BranchNotFound(_))
        ));
    }
}
