use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::RepositoryError;
use colored::Colorize;

impl Repository {
    /// Create a branch at the current head
    ///
    /// While the current branch has no commits the new branch is unborn too.
    pub fn create_branch(&self, branch_name: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let branch_name = BranchName::try_parse(branch_name.to_string())?;
        let source_oid = self.refs().read_head()?;

        self.refs()
            .create_branch(&branch_name, source_oid.as_ref())
    }

    pub fn delete_branch(&self, branch_name: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let branch_name = BranchName::try_parse(branch_name.to_string())?;

        if self.refs().is_current_branch(&branch_name)? {
            return Err(RepositoryError::DeleteCurrentBranch(
                branch_name.to_string(),
                self.path().to_path_buf(),
            )
            .into());
        }

        let oid = self.refs().delete_branch(&branch_name)?;

        match oid {
            Some(oid) => writeln!(
                self.writer(),
                "Deleted branch {} (was {}).",
                branch_name,
                oid.to_short_oid()
            )?,
            None => writeln!(self.writer(), "Deleted branch {}.", branch_name)?,
        }

        Ok(())
    }

    /// Every branch, sorted, paired with whether HEAD points at it
    pub fn list_branches(&self) -> anyhow::Result<Vec<(BranchName, bool)>> {
        self.ensure_initialized()?;

        let current = self.refs().current_branch()?;

        Ok(self
            .refs()
            .list_branches()?
            .into_iter()
            .map(|branch| {
                let is_current = branch == current;
                (branch, is_current)
            })
            .collect())
    }

    pub fn print_branches(&self) -> anyhow::Result<()> {
        for (branch, is_current) in self.list_branches()? {
            if is_current {
                writeln!(self.writer(), "* {}", branch.as_ref().green())?;
            } else {
                writeln!(self.writer(), "  {}", branch)?;
            }
        }

        Ok(())
    }
}
