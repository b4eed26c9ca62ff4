use crate::areas::config::IdentityStore;
use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::artifacts::ignore::IgnorePredicate;
use crate::artifacts::ignore::rules::IgnoreRules;
use crate::artifacts::staging::pipeline::StagingPipeline;
use crate::artifacts::staging::{DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS};
use crate::errors::RepositoryError;
use anyhow::Context;
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Default name of the metadata directory at the repository root
pub const METADATA_DIR: &str = ".gogit";

/// Where a repository lives and how staging is sized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    root: PathBuf,
    metadata_dir: String,
    workers: usize,
    queue_capacity: usize,
}

impl RepositoryConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        RepositoryConfig {
            root: root.into(),
            metadata_dir: METADATA_DIR.to_string(),
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity.max(1);
        self
    }

    pub fn with_metadata_dir(mut self, metadata_dir: impl Into<String>) -> Self {
        self.metadata_dir = metadata_dir.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn metadata_dir(&self) -> &str {
        &self.metadata_dir
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }
}

pub struct Repository {
    path: Box<Path>,
    config: RepositoryConfig,
    writer: RefCell<Box<dyn std::io::Write>>,
    index: Arc<Mutex<Index>>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
    identity: Box<dyn IdentityStore>,
    ignore_override: Option<Arc<dyn IgnorePredicate>>,
}

impl Repository {
    pub fn new(
        config: RepositoryConfig,
        writer: Box<dyn std::io::Write>,
        identity: Box<dyn IdentityStore>,
    ) -> anyhow::Result<Self> {
        if !config.root().exists() {
            std::fs::create_dir_all(config.root()).with_context(|| {
                format!("Unable to create directory {}", config.root().display())
            })?;
        }
        let path = config
            .root()
            .canonicalize()
            .with_context(|| format!("Unable to resolve {}", config.root().display()))?;
        let metadata_path = path.join(config.metadata_dir());

        let index = Index::new(metadata_path.join("index").into_boxed_path());
        let database = Database::new(metadata_path.join("objects").into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path(), config.metadata_dir());
        let refs = Refs::new(metadata_path.into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            config,
            writer: RefCell::new(writer),
            index: Arc::new(Mutex::new(index)),
            database,
            workspace,
            refs,
            identity,
            ignore_override: None,
        })
    }

    /// Use `ignore` instead of the rules in `.gogitignore`
    pub fn with_ignore(mut self, ignore: Arc<dyn IgnorePredicate>) -> Self {
        self.ignore_override = Some(ignore);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn repository_config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.path.join(self.config.metadata_dir())
    }

    pub fn is_initialized(&self) -> bool {
        self.metadata_path().is_dir()
    }

    pub fn ensure_initialized(&self) -> anyhow::Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(RepositoryError::NotARepository(self.path.to_path_buf()).into())
        }
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&self) -> Arc<Mutex<Index>> {
        self.index.clone()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn identity(&self) -> &dyn IdentityStore {
        self.identity.as_ref()
    }

    /// The override if one was given, otherwise the current `.gogitignore`
    pub fn ignore_predicate(&self) -> anyhow::Result<Arc<dyn IgnorePredicate>> {
        match &self.ignore_override {
            Some(ignore) => Ok(ignore.clone()),
            None => Ok(Arc::new(IgnoreRules::load(&self.path)?)),
        }
    }

    pub fn staging_pipeline(&self) -> anyhow::Result<StagingPipeline> {
        Ok(StagingPipeline::new(
            self.database.clone(),
            self.workspace.clone(),
            self.ignore_predicate()?,
            self.config.workers(),
            self.config.queue_capacity(),
        ))
    }
}
