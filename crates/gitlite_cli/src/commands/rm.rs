//! Unstage or remove a file.

use anyhow::Result;

pub fn run(path: &str) -> Result<()> {
    super::open_repo()?.rm(path)?;
    Ok(())
}
