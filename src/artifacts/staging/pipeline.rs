use crate::areas::database::Database;
use crate::areas::workspace::Workspace;
use crate::artifacts::ignore::IgnorePredicate;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};

/// Outcome of staging one file, sent from a worker to the collector
#[derive(Debug)]
pub struct StageResult {
    pub path: String,
    pub outcome: anyhow::Result<ObjectId>,
}

/// Counters describing one pipeline run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StagingReport {
    /// Files found by discovery
    pub discovered: usize,
    /// Entries added or whose hash changed
    pub updated: usize,
    /// Entries already staged with the same hash
    pub unchanged: usize,
    /// Files that could not be read, hashed, or stored
    pub failed: usize,
}

#[derive(Clone)]
pub struct StagingPipeline {
    database: Database,
    workspace: Workspace,
    ignore: Arc<dyn IgnorePredicate>,
    workers: usize,
    queue_capacity: usize,
}

impl StagingPipeline {
    pub fn new(
        database: Database,
        workspace: Workspace,
        ignore: Arc<dyn IgnorePredicate>,
        workers: usize,
        queue_capacity: usize,
    ) -> Self {
        StagingPipeline {
            database,
            workspace,
            ignore,
            workers: workers.max(1),
            queue_capacity: queue_capacity.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Stage every file under `roots` on top of `entries`
    ///
    /// Returns the updated path to blob map. Per-file failures are logged
    /// and counted, never fatal; a root that does not exist fails the run
    /// before any file is staged.
    pub async fn run(
        &self,
        roots: Vec<PathBuf>,
        entries: BTreeMap<String, ObjectId>,
    ) -> anyhow::Result<(BTreeMap<String, ObjectId>, StagingReport)> {
        if let Some(missing) = roots
            .iter()
            .find(|root| !self.workspace.resolve(root).exists())
        {
            return Err(RepositoryError::PathNotFound(missing.clone()).into());
        }

        let (path_tx, path_rx) = mpsc::channel::<String>(self.queue_capacity);
        let (result_tx, result_rx) = mpsc::channel::<StageResult>(self.queue_capacity);

        let collector = tokio::spawn(Self::collect(result_rx, entries));
        let discovery = self.spawn_discovery(roots, path_tx);

        let path_rx = Arc::new(Mutex::new(path_rx));
        let workers = (0..self.workers)
            .map(|worker_id| self.spawn_worker(worker_id, path_rx.clone(), result_tx.clone()))
            .collect::<Vec<_>>();

        let discovered = discovery.await?;

        for worker in workers {
            worker.await?;
        }
        drop(result_tx);

        let (entries, mut report) = collector.await?;
        report.discovered = discovered?;
        debug!(?report, "staging finished");

        Ok((entries, report))
    }

    fn spawn_discovery(
        &self,
        roots: Vec<PathBuf>,
        path_tx: mpsc::Sender<String>,
    ) -> tokio::task::JoinHandle<anyhow::Result<usize>> {
        let workspace = self.workspace.clone();
        let ignore = self.ignore.clone();

        tokio::task::spawn_blocking(move || {
            let mut discovered = 0;

            for root in &roots {
                workspace.walk_files(root, ignore.as_ref(), |path| {
                    path_tx.blocking_send(path).map_err(|_| {
                        anyhow::anyhow!("staging workers stopped before discovery finished")
                    })?;
                    discovered += 1;
                    Ok(())
                })?;
            }

            Ok(discovered)
        })
    }

    fn spawn_worker(
        &self,
        worker_id: usize,
        path_rx: Arc<Mutex<mpsc::Receiver<String>>>,
        result_tx: mpsc::Sender<StageResult>,
    ) -> tokio::task::JoinHandle<()> {
        let database = self.database.clone();
        let workspace = self.workspace.clone();

        tokio::spawn(async move {
            let mut staged = 0usize;

            loop {
                let next = path_rx.lock().await.recv().await;
                let Some(path) = next else {
                    break;
                };

                let outcome = {
                    let database = database.clone();
                    let workspace = workspace.clone();
                    let path = path.clone();

                    match tokio::task::spawn_blocking(move || {
                        stage_file(&database, &workspace, &path)
                    })
                    .await
                    {
                        Ok(outcome) => outcome,
                        Err(err) => Err(err.into()),
                    }
                };

                staged += 1;
                if result_tx.send(StageResult { path, outcome }).await.is_err() {
                    break;
                }
            }

            debug!(worker_id, staged, "staging worker finished");
        })
    }

    async fn collect(
        mut result_rx: mpsc::Receiver<StageResult>,
        mut entries: BTreeMap<String, ObjectId>,
    ) -> (BTreeMap<String, ObjectId>, StagingReport) {
        let mut report = StagingReport::default();

        while let Some(StageResult { path, outcome }) = result_rx.recv().await {
            match outcome {
                Ok(oid) if entries.get(&path) == Some(&oid) => report.unchanged += 1,
                Ok(oid) => {
                    entries.insert(path, oid);
                    report.updated += 1;
                }
                Err(err) => {
                    warn!(%path, "failed to stage file: {:#}", err);
                    report.failed += 1;
                }
            }
        }

        (entries, report)
    }
}

/// Read, hash, and store one file
fn stage_file(database: &Database, workspace: &Workspace, path: &str) -> anyhow::Result<ObjectId> {
    let (oid, content) = workspace.parse_blob(path)?.hash_object()?;
    database.write_if_absent(&oid, content)?;

    Ok(oid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::ignore::NoIgnore;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;

    fn pipeline(dir: &TempDir, workers: usize) -> StagingPipeline {
        let root = dir.path().canonicalize().unwrap();
        StagingPipeline::new(
            Database::new(root.join(".gogit").join("objects").into_boxed_path()),
            Workspace::new(root.into_boxed_path(), ".gogit"),
            Arc::new(NoIgnore),
            workers,
            2,
        )
    }

    #[tokio::test]
    async fn zero_workers_is_clamped_to_one() {
        let dir = TempDir::new().unwrap();
        dir.child("a.txt").write_str("a").unwrap();
        let pipeline = pipeline(&dir, 0);

        let (entries, report) = pipeline
            .run(vec![PathBuf::from(".")], BTreeMap::new())
            .await
            .unwrap();

        assert_eq!(pipeline.workers(), 1);
        assert_eq!(entries.len(), 1);
        assert_eq!(report.discovered, 1);
    }

    #[tokio::test]
    async fn unchanged_entries_are_counted_separately() {
        let dir = TempDir::new().unwrap();
        dir.child("a.txt").write_str("a").unwrap();
        dir.child("b.txt").write_str("b").unwrap();
        let pipeline = pipeline(&dir, 2);

        let (entries, _) = pipeline
            .run(vec![PathBuf::from(".")], BTreeMap::new())
            .await
            .unwrap();
        dir.child("b.txt").write_str("changed").unwrap();
        let (_, report) = pipeline
            .run(vec![PathBuf::from(".")], entries)
            .await
            .unwrap();

        assert_eq!(
            report,
            StagingReport {
                discovered: 2,
                updated: 1,
                unchanged: 1,
                failed: 0,
            }
        );
    }

    #[tokio::test]
    async fn missing_root_fails_before_staging() {
        let dir = TempDir::new().unwrap();
        dir.child("a.txt").write_str("a").unwrap();
        let pipeline = pipeline(&dir, 2);

        let err = pipeline
            .run(
                vec![PathBuf::from("a.txt"), PathBuf::from("missing")],
                BTreeMap::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RepositoryError>(),
            Some(RepositoryError::PathNotFound(_))
        ));
        assert!(!dir.path().join(".gogit").join("objects").exists());
    }
}
