use derive_new::new;
use std::path::Path;

#[derive(Debug, Clone, new)]
pub struct FileSpec {
    pub path: String,
    pub content: String,
}

pub fn write_file(root: &Path, spec: FileSpec) {
    let path = root.join(&spec.path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
    }
    std::fs::write(&path, spec.content).expect("Failed to write file");
}

pub fn read_file(root: &Path, path: &str) -> String {
    std::fs::read_to_string(root.join(path)).expect("Failed to read file")
}

pub fn delete_path(root: &Path, path: &str) {
    let path = root.join(path);
    if path.is_dir() {
        std::fs::remove_dir_all(&path).expect("Failed to delete dir");
    } else {
        std::fs::remove_file(&path).expect("Failed to delete file");
    }
}

/// Drop every permission on `path`; `false` when it stays readable (root)
#[cfg(unix)]
pub fn make_unreadable(root: &Path, path: &str) -> bool {
    use std::os::unix::fs::PermissionsExt;

    let path = root.join(path);
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o000))
        .expect("Failed to change permissions");
    std::fs::read(&path).is_err()
}

#[cfg(unix)]
pub fn make_readable(root: &Path, path: &str) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(root.join(path), std::fs::Permissions::from_mode(0o644))
        .expect("Failed to change permissions");
}
