use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// Run the binary in `dir` with its global config kept next to the repository
pub fn run_gogit_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("gogit").expect("Failed to find gogit binary");
    cmd.current_dir(dir)
        .env("GOGIT_CONFIG", dir.join(".gogitconfig"))
        .env("NO_COLOR", "1")
        .args(args);
    cmd
}

/// Initialize a repository in `dir` and configure an author
pub fn init_with_identity(dir: &Path) {
    run_gogit_command(dir, &["init"]).assert().success();
    run_gogit_command(dir, &["config", "user.name", "Ada Lovelace"])
        .assert()
        .success();
    run_gogit_command(dir, &["config", "user.email", "ada@example.com"])
        .assert()
        .success();
}
