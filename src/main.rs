use clap::{Parser, Subcommand};
use gogit::areas::config::GlobalConfig;
use gogit::areas::repository::{Repository, RepositoryConfig};
use gogit::artifacts::staging::{DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS};
use gogit::errors::RepositoryError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_ENV_VAR: &str = "GOGIT_LOG";

#[derive(Parser)]
#[command(
    name = "gogit",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A small content-addressable version control system",
    long_about = "gogit stores snapshots of a directory in a content-addressable object store. \
    It supports staging, committing, branching and switching branches, \
    and keeps its data in a .gogit directory at the repository root.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
)]
struct Cli {
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_WORKERS,
        help = "Number of workers hashing files during add"
    )]
    workers: usize,
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_QUEUE_CAPACITY,
        help = "Capacity of the staging queues"
    )]
    queue_capacity: usize,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(
        name = "add",
        about = "Add file contents to the index",
        long_about = "This command stages files, or every file below a directory, for the next commit."
    )]
    Add {
        #[arg(index = 1, required = true, help = "The files or directories to stage")]
        paths: Vec<String>,
    },
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command creates a new commit on the current branch from the staged files."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(name = "log", about = "Show the commit history of the current branch")]
    Log,
    #[command(name = "status", about = "Show the working tree status")]
    Status,
    #[command(
        name = "branch",
        about = "List, create, or delete branches",
        long_about = "Without arguments this command lists branches. \
        With a name it creates a branch at the current commit, with -d it deletes one."
    )]
    Branch {
        #[arg(index = 1, help = "The branch to create or delete")]
        name: Option<String>,
        #[arg(short = 'd', long = "delete", requires = "name", help = "Delete the branch")]
        delete: bool,
    },
    #[command(
        name = "checkout",
        about = "Switch branches",
        long_about = "This command updates the working directory, the index and HEAD to the given branch."
    )]
    Checkout {
        #[arg(short = 'b', help = "Create the branch before switching to it")]
        create: bool,
        #[arg(index = 1, help = "The branch to switch to")]
        name: String,
    },
    #[command(
        name = "config",
        about = "Get or set the author identity",
        long_about = "Keys are user.name and user.email. Pass 'list' to print every value."
    )]
    Config {
        #[arg(index = 1, help = "The key to read or write, or 'list'")]
        key: String,
        #[arg(index = 2, help = "The value to store")]
        value: Option<String>,
    },
    #[command(
        name = "cat-file",
        about = "Print the content of an object",
        long_about = "This command prints the content of an object in the repository. \
        It requires the SHA of the object to be specified."
    )]
    CatFile {
        #[arg(short = 'p', long, help = "The object SHA to print")]
        sha: String,
    },
    #[command(
        name = "hash-object",
        about = "Hash a file and optionally write it to the object database",
        long_about = "This command computes the blob ID of a file and can write it to the object database."
    )]
    HashObject {
        #[arg(short, long, required = false, help = "Write the object to the object database")]
        write: bool,
        #[arg(index = 1)]
        file: String,
    },
    #[command(name = "ls-tree", about = "List the contents of a tree object")]
    LsTree {
        #[arg(index = 1, default_value = "HEAD", help = "A tree or commit SHA, or HEAD")]
        object: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<RepositoryError>() {
                Some(RepositoryError::CheckoutConflict { message, .. }) => eprintln!("{}", message),
                _ => eprintln!("error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let root = match &cli.command {
        Commands::Init {
            path: Some(path), ..
        } => PathBuf::from(path),
        _ => std::env::current_dir()?,
    };

    let config = RepositoryConfig::new(root)
        .with_workers(cli.workers)
        .with_queue_capacity(cli.queue_capacity);
    let mut repository = Repository::new(
        config,
        Box::new(std::io::stdout()),
        Box::new(GlobalConfig::locate()?),
    )?;

    match cli.command {
        Commands::Init { .. } => repository.init().await?,
        Commands::Add { paths } => {
            repository.add(&paths).await?;
        }
        Commands::Commit { message } => {
            repository.commit(&message).await?;
        }
        Commands::Log => repository.log()?,
        Commands::Status => {
            let status = repository.status().await?;
            repository.print_status(&status)?;
        }
        Commands::Branch { name, delete } => match name {
            Some(name) if delete => repository.delete_branch(&name)?,
            Some(name) => repository.create_branch(&name)?,
            None => repository.print_branches()?,
        },
        Commands::Checkout { create, name } => repository.checkout(&name, create).await?,
        Commands::Config { key, value } => repository.config(&key, value.as_deref())?,
        Commands::CatFile { sha } => repository.cat_file(&sha)?,
        Commands::HashObject { write, file } => {
            repository.hash_object(&file, write)?;
        }
        Commands::LsTree { object } => repository.ls_tree(&object)?,
    }

    Ok(())
}
