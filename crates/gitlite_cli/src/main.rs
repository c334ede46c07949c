//! gitlite CLI - command-line interface for the gitlite version-control engine.

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use gitlite_core::GitliteError;

mod commands;

#[derive(Parser)]
#[command(name = "gitlite")]
#[command(about = "A minimal local version-control system", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new repository in the current directory
    Init,
    /// Stage a file for the next commit
    Add {
        /// File path, relative to the repository root
        path: String,
    },
    /// Record the staged changes
    Commit {
        /// Commit message
        message: String,
    },
    /// Unstage a file, and stage its removal if it is tracked
    Rm {
        /// File path
        path: String,
    },
    /// Show history from HEAD back to the initial commit
    Log,
    /// Show every commit ever made
    GlobalLog,
    /// Print the ids of commits with the given message
    Find {
        /// Exact commit message
        message: String,
    },
    /// Show branches, staged files and working-tree changes
    Status,
    /// Create a branch at HEAD
    Branch {
        /// Branch name
        name: String,
    },
    /// Delete a branch
    RmBranch {
        /// Branch name
        name: String,
    },
    /// Check out a branch
    Switch {
        /// Branch name
        branch: String,
    },
    /// Move the current branch to a commit and check it out
    Reset {
        /// Commit id or unique prefix
        commit: String,
    },
    /// Restore a file from HEAD (`<path>` or `-- <path>`), or from a commit
    /// with `<commit> -- <path>`
    Restore {
        /// File path, or the commit id when a path follows `--`
        #[arg(required_unless_present = "path")]
        target: Option<String>,
        /// File path after `--`
        #[arg(last = true)]
        path: Option<String>,
    },
}

fn main() -> Result<()> {
    // Respects RUST_LOG (e.g. RUST_LOG=gitlite_core=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match dispatch(cli.command) {
        Ok(()) => Ok(()),
        Err(err) => match err.downcast_ref::<GitliteError>() {
            // Expected outcomes: report and exit normally.
            Some(e) if e.is_user_error() => {
                println!("{}", e);
                if let Some(hint) = e.recovery_suggestion() {
                    println!("{} {}", style("hint:").cyan(), hint);
                }
                Ok(())
            }
            Some(e) => {
                if let Some(hint) = e.recovery_suggestion() {
                    eprintln!("{} {}", style("hint:").yellow(), hint);
                }
                Err(err)
            }
            None => Err(err),
        },
    }
}

fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Init => commands::init::run(),
        Commands::Add { path } => commands::add::run(&path),
        Commands::Commit { message } => commands::commit::run(&message),
        Commands::Rm { path } => commands::rm::run(&path),
        Commands::Log => commands::log::log(),
        Commands::GlobalLog => commands::log::global_log(),
        Commands::Find { message } => commands::log::find(&message),
        Commands::Status => commands::status::run(),
        Commands::Branch { name } => commands::branch::create(&name),
        Commands::RmBranch { name } => commands::branch::remove(&name),
        Commands::Switch { branch } => commands::branch::switch(&branch),
        Commands::Reset { commit } => commands::reset::run(&commit),
        Commands::Restore { target, path } => match restore_request(target, path)? {
            (Some(commit), path) => commands::restore::from_commit(&commit, &path),
            (None, path) => commands::restore::from_head(&path),
        },
    }
}

/// Splits `restore` arguments into an optional commit and the file path.
fn restore_request(
    target: Option<String>,
    path: Option<String>,
) -> Result<(Option<String>, String)> {
    match (target, path) {
        (Some(commit), Some(path)) => Ok((Some(commit), path)),
        (None, Some(path)) | (Some(path), None) => Ok((None, path)),
        (None, None) => anyhow::bail!("restore needs a file path"),
    }
}
