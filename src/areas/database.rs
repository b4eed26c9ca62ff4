//! Content-addressable object database
//!
//! Objects live under `objects/<2-hex>/<38-hex>` and hold the header-tagged
//! payload uncompressed. Writes are create-if-absent: the existence check and
//! the write are not atomic together, so two writers racing on the same new
//! object may both write it. Each write goes through a temporary file that is
//! renamed into place, so readers only ever see complete objects and the
//! racing writers produce identical bytes.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::RepositoryError;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).exists()
    }

    /// Store an object unless it already exists and return its ID
    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let (object_id, object_content) = object.hash_object()?;
        self.write_if_absent(&object_id, object_content)?;

        Ok(object_id)
    }

    /// Write serialized object bytes at the fan-out path for `object_id`
    ///
    /// Returns `false` when an object already exists at that path; it is
    /// treated as identical by construction.
    pub fn write_if_absent(&self, object_id: &ObjectId, content: Bytes) -> anyhow::Result<bool> {
        let object_path = self.path.join(object_id.to_path());

        if object_path.exists() {
            return Ok(false);
        }

        std::fs::create_dir_all(
            object_path
                .parent()
                .context(format!("Invalid object path {}", object_path.display()))?,
        )
        .context(format!(
            "Unable to create object directory {}",
            object_path.display()
        ))?;

        self.write_object(object_path, content)?;
        debug!(oid = %object_id, "stored object");

        Ok(true)
    }

    /// Raw stored bytes of an object, header included
    pub fn load(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        let object_path = self.path.join(object_id.to_path());

        match std::fs::read(&object_path) {
            Ok(content) => Ok(Bytes::from(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(RepositoryError::ObjectNotFound(object_id.clone()).into())
            }
            Err(err) => Err(err).context(format!(
                "Unable to read object file {}",
                object_path.display()
            )),
        }
    }

    /// Object payload with the `<type> <size>\0` header stripped
    pub fn read_object(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        Ok(self.parse_object_as_bytes(object_id)?.1)
    }

    pub fn parse_object_as_blob(&self, object_id: &ObjectId) -> anyhow::Result<Option<Blob>> {
        match self.parse_object_as_bytes(object_id)? {
            (ObjectType::Blob, payload) => Ok(Some(Blob::deserialize(Cursor::new(payload))?)),
            _ => Ok(None),
        }
    }

    pub fn parse_object_as_tree(&self, object_id: &ObjectId) -> anyhow::Result<Option<Tree>> {
        match self.parse_object_as_bytes(object_id)? {
            (ObjectType::Tree, payload) => Ok(Some(Tree::deserialize(Cursor::new(payload))?)),
            _ => Ok(None),
        }
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> anyhow::Result<Option<Commit>> {
        match self.parse_object_as_bytes(object_id)? {
            (ObjectType::Commit, payload) => {
                Ok(Some(Commit::deserialize(Cursor::new(payload))?))
            }
            _ => Ok(None),
        }
    }

    /// Flattened tree of a commit, or an empty tree when there is no commit
    pub fn load_snapshot(&self, commit_oid: Option<&ObjectId>) -> anyhow::Result<Tree> {
        let Some(commit_oid) = commit_oid else {
            return Ok(Tree::default());
        };

        let commit = self
            .parse_object_as_commit(commit_oid)?
            .ok_or_else(|| RepositoryError::CorruptObject {
                oid: commit_oid.clone(),
                reason: "expected a commit".to_string(),
            })?;

        self.parse_object_as_tree(commit.tree_oid())?
            .ok_or_else(|| {
                RepositoryError::CorruptObject {
                    oid: commit.tree_oid().clone(),
                    reason: "expected a tree".to_string(),
                }
                .into()
            })
    }

    pub fn get_object_type(&self, object_id: &ObjectId) -> anyhow::Result<ObjectType> {
        Ok(self.parse_object_as_bytes(object_id)?.0)
    }

    fn parse_object_as_bytes(&self, object_id: &ObjectId) -> anyhow::Result<(ObjectType, Bytes)> {
        let content = self.load(object_id)?;

        let (object_type, payload) =
            ObjectType::split_object(&content).map_err(|err| RepositoryError::CorruptObject {
                oid: object_id.clone(),
                reason: err.to_string(),
            })?;
        let payload = content.slice_ref(payload);

        Ok((object_type, payload))
    }

    fn write_object(&self, object_path: PathBuf, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        file.write_all(&object_content).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, &object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u64>())
    }
}
