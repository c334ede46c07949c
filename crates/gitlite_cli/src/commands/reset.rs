//! Reset the current branch to a commit.

use anyhow::Result;

pub fn run(commit: &str) -> Result<()> {
    super::open_repo()?.reset(commit)?;
    Ok(())
}
