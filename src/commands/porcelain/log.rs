use crate::areas::repository::Repository;
use crate::artifacts::log::rev_list::RevList;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use colored::Colorize;

impl Repository {
    pub fn log(&self) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let branch = self.refs().current_branch()?;
        let head = self.refs().read_head()?;

        if head.is_none() {
            writeln!(
                self.writer(),
                "your current branch '{}' does not have any commits yet",
                branch
            )?;
            return Ok(());
        }

        for entry in RevList::new(self.database(), head) {
            let (commit_oid, commit) = entry?;
            self.show_commit_medium(&commit_oid, &commit)?;
        }

        Ok(())
    }

    fn show_commit_medium(&self, commit_oid: &ObjectId, commit: &Commit) -> anyhow::Result<()> {
        writeln!(
            self.writer(),
            "{}",
            format!("commit {}", commit_oid).yellow()
        )?;
        writeln!(self.writer(), "Author: {}", commit.author().display_name())?;
        writeln!(self.writer(), "Date:   {}", commit.readable_timestamp())?;
        writeln!(self.writer())?;
        for message_line in commit.message().lines() {
            writeln!(self.writer(), "    {}", message_line)?;
        }
        writeln!(self.writer())?;

        Ok(())
    }
}
