use crate::areas::refs::HEAD_REF_NAME;
use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::FILE_MODE;
use crate::errors::RepositoryError;

impl Repository {
    /// List a tree, given its hash, a commit hash, or `HEAD`
    pub fn ls_tree(&self, object_sha: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let oid = if object_sha == HEAD_REF_NAME {
            self.refs().read_head()?.ok_or_else(|| {
                anyhow::anyhow!(
                    "branch '{}' does not have any commits yet",
                    self.refs()
                        .current_branch()
                        .map(|branch| branch.to_string())
                        .unwrap_or_default()
                )
            })?
        } else {
            ObjectId::try_parse(object_sha.to_string())?
        };

        let tree_oid = match self.database().parse_object_as_commit(&oid)? {
            Some(commit) => commit.tree_oid().clone(),
            None => oid,
        };

        let tree = self
            .database()
            .parse_object_as_tree(&tree_oid)?
            .ok_or_else(|| RepositoryError::CorruptObject {
                oid: tree_oid.clone(),
                reason: "not a tree object".to_string(),
            })?;

        for (path, blob_oid) in tree.entries() {
            writeln!(self.writer(), "{} blob {}\t{}", FILE_MODE, blob_oid, path)?;
        }

        Ok(())
    }
}
