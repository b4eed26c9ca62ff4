use crate::areas::repository::Repository;
use crate::artifacts::status::file_change::FileChangeType;
use crate::artifacts::status::status_info::StatusInfo;
use colored::Colorize;

impl Repository {
    pub async fn status(&mut self) -> anyhow::Result<StatusInfo> {
        self.ensure_initialized()?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let branch = self.refs().current_branch()?;
        let head = self.database().load_snapshot(self.refs().read_head()?.as_ref())?;
        let working = self.workspace().snapshot(self.ignore_predicate()?.as_ref())?;

        Ok(StatusInfo::compute(
            branch,
            head.entries(),
            index.entries(),
            &working,
        ))
    }

    pub fn print_status(&self, status: &StatusInfo) -> anyhow::Result<()> {
        writeln!(self.writer(), "On branch {}", status.branch)?;

        if !status.staged.is_empty() {
            writeln!(self.writer(), "\nChanges to be committed:")?;
            for (path, change) in &status.staged {
                writeln!(
                    self.writer(),
                    "{}{}",
                    FileChangeType::Index(*change),
                    path.green()
                )?;
            }
        }

        if !status.unstaged.is_empty() {
            writeln!(self.writer(), "\nChanges not staged for commit:")?;
            writeln!(
                self.writer(),
                "  (use \"gogit add <file>...\" to update what will be committed)"
            )?;
            for (path, change) in &status.unstaged {
                writeln!(
                    self.writer(),
                    "{}{}",
                    FileChangeType::Workspace(*change),
                    path.red()
                )?;
            }
        }

        if !status.untracked.is_empty() {
            writeln!(self.writer(), "\nUntracked files:")?;
            writeln!(
                self.writer(),
                "  (use \"gogit add <file>...\" to include in what will be committed)"
            )?;
            for path in &status.untracked {
                writeln!(self.writer(), "        {}", path.red())?;
            }
        }

        if status.is_clean() {
            writeln!(self.writer(), "\nnothing to commit, working tree clean")?;
        }

        Ok(())
    }
}
