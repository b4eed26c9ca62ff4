use crate::areas::repository::Repository;
use crate::artifacts::ignore::rules::{DEFAULT_IGNORE_PATTERNS, IGNORE_FILE_NAME};
use crate::errors::RepositoryError;
use anyhow::Context;
use std::fs;

impl Repository {
    pub async fn init(&mut self) -> anyhow::Result<()> {
        let metadata_path = self.metadata_path();
        if metadata_path.exists() {
            return Err(RepositoryError::RepositoryAlreadyExists(self.path().to_path_buf()).into());
        }

        fs::create_dir_all(self.database().objects_path())
            .context("Failed to create objects directory")?;

        self.refs()
            .initialize()
            .context("Failed to create initial HEAD reference")?;

        let index = self.index();
        let mut index = index.lock().await;
        index
            .write_updates()
            .context("Failed to create index file")?;

        let ignore_path = self.path().join(IGNORE_FILE_NAME);
        if !ignore_path.exists() {
            fs::write(&ignore_path, format!("{}\n", DEFAULT_IGNORE_PATTERNS.join("\n")))
                .with_context(|| format!("Failed to create {}", IGNORE_FILE_NAME))?;
        }

        writeln!(
            self.writer(),
            "Initialized empty gogit repository in {}",
            metadata_path.display()
        )?;

        Ok(())
    }
}
