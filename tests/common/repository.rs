use assert_fs::TempDir;
use gogit::areas::config::{IdentityStore, MemoryIdentity};
use gogit::areas::repository::{Repository, RepositoryConfig};
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Writer whose output stays readable after the repository takes ownership
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub fn open_repository(
    dir: &TempDir,
    workers: usize,
    identity: impl IdentityStore + 'static,
) -> (Repository, SharedBuffer) {
    colored::control::set_override(false);

    let buffer = SharedBuffer::default();
    let config = RepositoryConfig::new(dir.path()).with_workers(workers);
    let repository = Repository::new(config, Box::new(buffer.clone()), Box::new(identity))
        .expect("Failed to open repository");

    (repository, buffer)
}

/// An initialized repository with an author configured
pub async fn init_repository(dir: &TempDir) -> (Repository, SharedBuffer) {
    let (mut repository, buffer) =
        open_repository(dir, 4, MemoryIdentity::new("Ada Lovelace", "ada@example.com"));
    repository.init().await.expect("Failed to init repository");
    buffer.clear();

    (repository, buffer)
}
