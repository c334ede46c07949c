//! Restore files from history.

use anyhow::Result;

/// `restore <path>` or `restore -- <path>`
pub fn from_head(path: &str) -> Result<()> {
    super::open_repo()?.restore(path)?;
    Ok(())
}

/// `restore <commit> -- <path>`
pub fn from_commit(commit: &str, path: &str) -> Result<()> {
    super::open_repo()?.restore_from(commit, path)?;
    Ok(())
}
