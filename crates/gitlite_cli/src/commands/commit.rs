//! Commit command.

use anyhow::Result;

/// Record the staged changes with `message`.
pub fn run(message: &str) -> Result<()> {
    let repo = super::open_repo()?;
    repo.commit(message)?;
    Ok(())
}
