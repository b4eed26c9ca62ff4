use crate::areas::database::Database;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use derive_new::new;

/// Commits from `start` back to the root, newest first
///
/// Yields an error and stops when a commit cannot be read.
#[derive(Clone, new)]
pub struct RevList<'d> {
    database: &'d Database,
    current_commit_oid: Option<ObjectId>,
}

impl Iterator for RevList<'_> {
    type Item = anyhow::Result<(ObjectId, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        let commit_oid = self.current_commit_oid.take()?;

        match self.database.parse_object_as_commit(&commit_oid) {
            Ok(Some(commit)) => {
                self.current_commit_oid = commit.parent().cloned();
                Some(Ok((commit_oid, commit)))
            }
            Ok(None) => Some(Err(RepositoryError::CorruptObject {
                oid: commit_oid,
                reason: "expected a commit".to_string(),
            }
            .into())),
            Err(err) => Some(Err(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::blob::Blob;
    use crate::artifacts::objects::commit::Author;
    use crate::artifacts::objects::tree::Tree;
    use assert_fs::TempDir;
    use bytes::Bytes;
    use pretty_assertions::assert_eq;

    fn commit(database: &Database, parent: Option<ObjectId>, message: &str) -> ObjectId {
        let tree_oid = database.store(&Tree::default()).unwrap();
        let author = Author::new("Ada".to_string(), "ada@example.com".to_string());

        database
            .store(&Commit::new(parent, tree_oid, author, message.to_string()))
            .unwrap()
    }

    #[test]
    fn walks_parent_chain_newest_first() {
        let dir = TempDir::new().unwrap();
        let database = Database::new(dir.path().join("objects").into_boxed_path());
        let first = commit(&database, None, "first");
        let second = commit(&database, Some(first.clone()), "second");
        let third = commit(&database, Some(second.clone()), "third");

        let history = RevList::new(&database, Some(third.clone()))
            .map(|entry| entry.map(|(oid, commit)| (oid, commit.message().to_string())))
            .collect::<anyhow::Result<Vec<_>>>()
            .unwrap();

        assert_eq!(
            history,
            vec![
                (third, "third".to_string()),
                (second, "second".to_string()),
                (first, "first".to_string()),
            ]
        );
    }

    #[test]
    fn unborn_branch_has_no_history() {
        let dir = TempDir::new().unwrap();
        let database = Database::new(dir.path().join("objects").into_boxed_path());

        assert_eq!(RevList::new(&database, None).count(), 0);
    }

    #[test]
    fn non_commit_object_stops_the_walk() {
        let dir = TempDir::new().unwrap();
        let database = Database::new(dir.path().join("objects").into_boxed_path());
        let blob_oid = database
            .store(&Blob::new(Bytes::from_static(b"not a commit")))
            .unwrap();

        let mut rev_list = RevList::new(&database, Some(blob_oid));

        assert!(rev_list.next().unwrap().is_err());
        assert!(rev_list.next().is_none());
    }
}
