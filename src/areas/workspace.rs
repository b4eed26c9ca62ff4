use crate::artifacts::ignore::IgnorePredicate;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

/// Directory names never descended into, besides the metadata directory
const RESERVED_DIRS: [&str; 1] = [".git"];

/// Working directory access
///
/// Files are addressed by repository-relative paths joined with `/`, the
/// same keys the index and trees use.
#[derive(Debug, Clone)]
pub struct Workspace {
    path: Box<Path>,
    metadata_dir: String,
}

impl Workspace {
    pub fn new(path: Box<Path>, metadata_dir: impl Into<String>) -> Self {
        Workspace {
            path,
            metadata_dir: metadata_dir.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_reserved(&self, name: &str) -> bool {
        name == self.metadata_dir || RESERVED_DIRS.contains(&name)
    }

    /// Absolute location of `path`; relative paths are taken from the root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.path.join(path)
        }
    }

    pub fn relative_path(&self, path: &Path) -> anyhow::Result<String> {
        let relative_path = path.strip_prefix(self.path.as_ref()).with_context(|| {
            format!(
                "{} is outside the repository at {}",
                path.display(),
                self.path.display()
            )
        })?;

        Ok(relative_path
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"))
    }

    fn is_excluded(&self, entry: &DirEntry, ignore: &dyn IgnorePredicate) -> bool {
        let Ok(relative_path) = self.relative_path(entry.path()) else {
            return true;
        };

        if relative_path.is_empty() {
            return false;
        }

        relative_path
            .split('/')
            .any(|component| self.is_reserved(component))
            || ignore.is_ignored(&relative_path, entry.file_type().is_dir())
    }

    /// Visit every tracked-candidate file at or below `start`
    ///
    /// Reserved directories and ignored paths are pruned: an ignored
    /// directory is not descended into. Unreadable entries below `start` are
    /// logged and skipped; a missing `start` is `PathNotFound`.
    pub fn walk_files(
        &self,
        start: &Path,
        ignore: &dyn IgnorePredicate,
        visit: impl FnMut(String) -> anyhow::Result<()>,
    ) -> anyhow::Result<()> {
        self.walk(start, ignore, false, visit)
    }

    /// Like `walk_files`, but `strict` turns unreadable entries into errors
    fn walk(
        &self,
        start: &Path,
        ignore: &dyn IgnorePredicate,
        strict: bool,
        mut visit: impl FnMut(String) -> anyhow::Result<()>,
    ) -> anyhow::Result<()> {
        let start_path = self.resolve(start);
        if !start_path.exists() {
            return Err(RepositoryError::PathNotFound(start.to_path_buf()).into());
        }
        let start_path = start_path
            .canonicalize()
            .with_context(|| format!("Unable to resolve {}", start.display()))?;

        let walker = WalkDir::new(&start_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_excluded(entry, ignore));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if strict || err.depth() == 0 => {
                    return Err(err)
                        .with_context(|| format!("Unable to walk {}", start_path.display()));
                }
                Err(err) => {
                    warn!(error = %err, "skipping unreadable path");
                    continue;
                }
            };

            if entry.file_type().is_file() {
                visit(self.relative_path(entry.path())?)?;
            }
        }

        Ok(())
    }

    pub fn list_files(
        &self,
        start: &Path,
        ignore: &dyn IgnorePredicate,
    ) -> anyhow::Result<Vec<String>> {
        let mut files = Vec::new();
        self.walk_files(start, ignore, |path| {
            files.push(path);
            Ok(())
        })?;

        Ok(files)
    }

    /// Blob hash of every file in the working directory
    ///
    /// Any file or directory that cannot be read fails the snapshot: a path
    /// missing from it reads as deleted, which checkout would act on.
    pub fn snapshot(
        &self,
        ignore: &dyn IgnorePredicate,
    ) -> anyhow::Result<BTreeMap<String, ObjectId>> {
        let mut snapshot = BTreeMap::new();

        self.walk(&self.path, ignore, true, |path| {
            let oid = self.hash_file(&path)?;
            snapshot.insert(path, oid);
            Ok(())
        })?;

        Ok(snapshot)
    }

    pub fn exists(&self, file_path: &str) -> bool {
        self.path.join(file_path).is_file()
    }

    pub fn read_file(&self, file_path: &str) -> anyhow::Result<Bytes> {
        let content = std::fs::read(self.path.join(file_path))
            .with_context(|| format!("Unable to read file {}", file_path))?;

        Ok(Bytes::from(content))
    }

    pub fn parse_blob(&self, file_path: &str) -> anyhow::Result<Blob> {
        Ok(Blob::new(self.read_file(file_path)?))
    }

    pub fn hash_file(&self, file_path: &str) -> anyhow::Result<ObjectId> {
        self.parse_blob(file_path)?.object_id()
    }

    /// Write `content` at `file_path`, creating parent directories
    pub fn write_file(&self, file_path: &str, content: &[u8]) -> anyhow::Result<()> {
        let path = self.path.join(file_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for {}", file_path))?;
        }

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("Failed to open file {}", file_path))?;
        file.write_all(content)
            .with_context(|| format!("Failed to write file {}", file_path))?;

        Ok(())
    }

    /// Delete a file and any directories it leaves empty
    pub fn remove_file(&self, file_path: &str) -> anyhow::Result<()> {
        let path = self.path.join(file_path);

        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to remove file {}", file_path));
            }
        }

        self.prune_empty_parent_dirs(&path)
    }

    fn prune_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.path.as_ref()
            && parent.is_dir()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent).with_context(|| {
                format!("Failed to remove empty directory {}", parent.display())
            })?;
            self.prune_empty_parent_dirs(parent)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::ignore::NoIgnore;
    use crate::artifacts::ignore::rules::IgnoreRules;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;

    fn workspace(dir: &TempDir) -> Workspace {
        Workspace::new(dir.path().canonicalize().unwrap().into_boxed_path(), ".gogit")
    }

    #[test]
    fn walk_skips_metadata_and_ignored_paths() {
        let dir = TempDir::new().unwrap();
        dir.child("a.txt").write_str("a").unwrap();
        dir.child("src/lib.rs").write_str("lib").unwrap();
        dir.child("target/debug/app").write_str("bin").unwrap();
        dir.child(".gogit/HEAD").write_str("ref: refs/heads/main\n").unwrap();
        dir.child(".git/config").write_str("").unwrap();
        let workspace = workspace(&dir);
        let rules = IgnoreRules::from_patterns(workspace.path(), ["target/"]).unwrap();

        let files = workspace.list_files(workspace.path(), &rules).unwrap();

        assert_eq!(files, vec!["a.txt".to_string(), "src/lib.rs".to_string()]);
    }

    #[test]
    fn walk_of_single_file_yields_it() {
        let dir = TempDir::new().unwrap();
        dir.child("docs/readme.md").write_str("# hi").unwrap();
        let workspace = workspace(&dir);

        let files = workspace
            .list_files(Path::new("docs/readme.md"), &NoIgnore)
            .unwrap();

        assert_eq!(files, vec!["docs/readme.md".to_string()]);
    }

    #[test]
    fn walk_of_missing_path_is_not_found() {
        let dir = TempDir::new().unwrap();
        let workspace = workspace(&dir);

        let err = workspace
            .list_files(Path::new("nope"), &NoIgnore)
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RepositoryError>(),
            Some(RepositoryError::PathNotFound(_))
        ));
    }

    #[test]
    fn removing_last_file_prunes_directories() {
        let dir = TempDir::new().unwrap();
        let workspace = workspace(&dir);
        workspace.write_file("a/b/c.txt", b"c").unwrap();

        workspace.remove_file("a/b/c.txt").unwrap();

        assert!(!dir.path().join("a").exists());
        assert!(dir.path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn snapshot_fails_on_unreadable_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        dir.child("secret.txt").write_str("edited").unwrap();
        let secret = dir.path().join("secret.txt");
        std::fs::set_permissions(&secret, std::fs::Permissions::from_mode(0o000)).unwrap();
        if std::fs::read(&secret).is_ok() {
            // permissions are not enforced for this user
            return;
        }
        let workspace = workspace(&dir);

        let result = workspace.snapshot(&NoIgnore);

        std::fs::set_permissions(&secret, std::fs::Permissions::from_mode(0o644)).unwrap();
        assert!(result.is_err());
        let listed = workspace.list_files(workspace.path(), &NoIgnore).unwrap();
        assert_eq!(listed, vec!["secret.txt"]);
    }

    #[test]
    fn snapshot_hashes_files_as_blobs() {
        let dir = TempDir::new().unwrap();
        dir.child("hello.txt").write_str("hello world").unwrap();
        let workspace = workspace(&dir);

        let snapshot = workspace.snapshot(&NoIgnore).unwrap();

        assert_eq!(
            snapshot.get("hello.txt").map(|oid| oid.as_ref()),
            Some("95d09f2b10159347eece71399a7e2e907ea3df4f")
        );
    }
}
