use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;

impl Repository {
    /// Print an object's payload as stored
    pub fn cat_file(&self, object_id: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let object_id = ObjectId::try_parse(object_id.to_string())?;
        let payload = self.database().read_object(&object_id)?;

        self.writer().write_all(&payload)?;

        Ok(())
    }
}
