use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::migration::Migration;

impl Repository {
    /// Switch the working directory, index, and HEAD to `target`
    ///
    /// With `create_if_missing` the branch is first created at the current
    /// head. Local edits the switch would overwrite abort it before any file
    /// is touched.
    pub async fn checkout(&mut self, target: &str, create_if_missing: bool) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        if create_if_missing {
            self.create_branch(target)?;
        }

        let target_branch = BranchName::try_parse(target.to_string())?;
        let target_oid = self.refs().read_ref(&target_branch)?;
        let current_branch = self.refs().current_branch()?;
        let current_oid = self.refs().read_head()?;

        let current = self.database().load_snapshot(current_oid.as_ref())?;
        let target_snapshot = self.database().load_snapshot(target_oid.as_ref())?;
        let working = self.workspace().snapshot(self.ignore_predicate()?.as_ref())?;

        let index = self.index();
        let mut index = index.lock().await;

        index.rehydrate()?;

        let mut migration = Migration::new(
            self.database(),
            self.workspace(),
            current.entries(),
            target_snapshot.entries(),
        );
        migration.plan_changes(&working)?;
        migration.apply_changes(target, &mut index)?;

        index.write_updates()?;
        self.refs().set_head(&target_branch)?;

        if current_branch == target_branch {
            writeln!(self.writer(), "Already on '{}'", target_branch)?;
        } else {
            writeln!(self.writer(), "Switched to branch '{}'", target_branch)?;
        }

        Ok(())
    }
}
