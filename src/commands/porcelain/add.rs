use crate::areas::repository::Repository;
use crate::artifacts::staging::pipeline::StagingReport;
use anyhow::Context;
use std::path::PathBuf;
use tracing::info;

impl Repository {
    /// Stage files and directories
    ///
    /// Tracked files under a staged path that no longer exist are unstaged,
    /// so `add .` also records deletions.
    pub async fn add(&mut self, paths: &[String]) -> anyhow::Result<StagingReport> {
        self.ensure_initialized()?;

        let index = self.index();
        let mut index = index.lock().await;

        // Load the index file from the disk
        index.rehydrate()?;

        let roots = paths.iter().map(PathBuf::from).collect::<Vec<_>>();
        let pipeline = self.staging_pipeline()?;
        let (mut entries, report) = pipeline.run(roots.clone(), index.entries().clone()).await?;

        for root in &roots {
            let root_path = self
                .workspace()
                .resolve(root)
                .canonicalize()
                .with_context(|| format!("Unable to resolve {}", root.display()))?;
            let prefix = self.workspace().relative_path(&root_path)?;

            for path in index.entries_under_path(&prefix) {
                if !self.workspace().exists(&path) {
                    entries.remove(&path);
                }
            }
        }

        index.replace_entries(entries);
        index.write_updates()?;

        info!(
            discovered = report.discovered,
            updated = report.updated,
            failed = report.failed,
            "staged files"
        );

        Ok(report)
    }
}
