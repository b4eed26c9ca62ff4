use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use tracing::warn;

impl Repository {
    /// Record the index as a new commit on the current branch
    ///
    /// Returns `None` without writing anything when no identity is
    /// configured or the index is empty.
    pub async fn commit(&mut self, message: &str) -> anyhow::Result<Option<ObjectId>> {
        self.ensure_initialized()?;

        let Some(identity) = self.identity().identity()? else {
            warn!(
                "author identity unknown, set it with `gogit config user.name` and `gogit config user.email`"
            );
            return Ok(None);
        };

        let index = self.index();
        let mut index = index.lock().await;

        // Load the index file from the disk
        index.rehydrate()?;

        if index.is_empty() {
            warn!("nothing to commit, the index is empty");
            return Ok(None);
        }

        let tree = Tree::build(index.entries().iter());
        let tree_oid = self.database().store(&tree)?;

        let branch = self.refs().current_branch()?;
        let parent = self.refs().read_head()?;
        let is_root = match parent {
            Some(_) => "",
            None => " (root-commit)",
        };

        let commit = Commit::new(
            parent,
            tree_oid,
            identity.to_author(),
            message.trim().to_string(),
        );
        let commit_oid = self.database().store(&commit)?;
        self.refs().update_head(&commit_oid)?;

        writeln!(
            self.writer(),
            "[{}{} {}] {}",
            branch,
            is_root,
            commit_oid.to_short_oid(),
            commit.short_message()
        )?;

        Ok(Some(commit_oid))
    }
}
