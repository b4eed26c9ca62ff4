use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use bytes::Bytes;
use std::path::Path;

impl Repository {
    pub fn hash_object(&self, object_path: &str, write: bool) -> anyhow::Result<ObjectId> {
        let path = self.workspace().resolve(Path::new(object_path));
        let data = std::fs::read(&path)
            .with_context(|| format!("Unable to read file {}", path.display()))?;
        let object = Blob::new(Bytes::from(data));

        let object_id = if write {
            self.ensure_initialized()?;
            self.database().store(&object)?
        } else {
            object.object_id()?
        };

        writeln!(self.writer(), "{}", object_id)?;

        Ok(object_id)
    }
}
