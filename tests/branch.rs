use assert_fs::TempDir;
use common::command::repository_dir;
use common::file::{FileSpec, write_file};
use common::repository::{SharedBuffer, init_repository};
use gogit::areas::repository::Repository;
use gogit::artifacts::branch::branch_name::BranchName;
use gogit::errors::RepositoryError;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

async fn repository_with_commit(dir: &TempDir) -> (Repository, SharedBuffer) {
    let (mut repository, output) = init_repository(dir).await;
    write_file(dir.path(), FileSpec::new("a.txt".into(), "1".into()));
    repository.add(&["a.txt".into()]).await.unwrap();
    repository.commit("first").await.unwrap();
    output.clear();

    (repository, output)
}

fn branch_names(repository: &Repository) -> Vec<(String, bool)> {
    repository
        .list_branches()
        .unwrap()
        .into_iter()
        .map(|(name, is_current)| (name.to_string(), is_current))
        .collect()
}

#[rstest]
#[tokio::test]
async fn new_branch_points_at_head(repository_dir: TempDir) {
    let (repository, _) = repository_with_commit(&repository_dir).await;
    let head = repository.refs().read_head().unwrap();

    repository.create_branch("feature").unwrap();

    let feature = BranchName::try_parse("feature".to_string()).unwrap();
    assert_eq!(repository.refs().read_ref(&feature).unwrap(), head);
    assert_eq!(
        branch_names(&repository),
        vec![("feature".to_string(), false), ("main".to_string(), true)]
    );
}

#[rstest]
#[tokio::test]
async fn duplicate_branch_is_rejected(repository_dir: TempDir) {
    let (repository, _) = repository_with_commit(&repository_dir).await;
    repository.create_branch("feature").unwrap();

    let err = repository.create_branch("feature").unwrap_err();

    assert!(matches!(
        err.downcast_ref::<RepositoryError>(),
        Some(RepositoryError::BranchAlreadyExists(name)) if name == "feature"
    ));
}

#[rstest]
#[case("")]
#[case(".hidden")]
#[case("a..b")]
#[case("ends.lock")]
#[case("has space")]
#[tokio::test]
async fn invalid_names_are_rejected(repository_dir: TempDir, #[case] name: &str) {
    let (repository, _) = repository_with_commit(&repository_dir).await;

    let err = repository.create_branch(name).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<RepositoryError>(),
        Some(RepositoryError::InvalidBranchName(_))
    ));
}

#[rstest]
#[tokio::test]
async fn hierarchical_branches_are_listed_by_full_name(repository_dir: TempDir) {
    let (repository, output) = repository_with_commit(&repository_dir).await;
    repository.create_branch("feature/login").unwrap();
    repository.create_branch("bugfix").unwrap();

    repository.print_branches().unwrap();

    assert_eq!(output.contents(), "  bugfix\n  feature/login\n* main\n");
}

#[rstest]
#[tokio::test]
async fn current_branch_cannot_be_deleted(repository_dir: TempDir) {
    let (repository, _) = repository_with_commit(&repository_dir).await;

    let err = repository.delete_branch("main").unwrap_err();

    assert!(matches!(
        err.downcast_ref::<RepositoryError>(),
        Some(RepositoryError::DeleteCurrentBranch(name, _)) if name == "main"
    ));
    assert_eq!(branch_names(&repository), vec![("main".to_string(), true)]);
}

#[rstest]
#[tokio::test]
async fn deleted_branch_disappears_from_the_list(repository_dir: TempDir) {
    let (repository, output) = repository_with_commit(&repository_dir).await;
    let head = repository.refs().read_head().unwrap().unwrap();
    repository.create_branch("feature/login").unwrap();

    repository.delete_branch("feature/login").unwrap();

    assert_eq!(
        output.contents(),
        format!("Deleted branch feature/login (was {}).\n", head.to_short_oid())
    );
    assert_eq!(branch_names(&repository), vec![("main".to_string(), true)]);
    assert!(!repository_dir.path().join(".gogit/refs/heads/feature").exists());
}

#[rstest]
#[tokio::test]
async fn deleting_a_missing_branch_fails(repository_dir: TempDir) {
    let (repository, _) = repository_with_commit(&repository_dir).await;

    let err = repository.delete_branch("nope").unwrap_err();

    assert!(matches!(
        err.downcast_ref::<RepositoryError>(),
        Some(RepositoryError::BranchNotFound(name)) if name == "nope"
    ));
}
