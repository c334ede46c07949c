//! Stage a file.

use anyhow::Result;
use tracing::debug;

/// Snapshot `path` and reconcile it with the staging area.
pub fn run(path: &str) -> Result<()> {
    let repo = super::open_repo()?;
    let outcome = repo.add(path)?;
    debug!(?outcome, "add finished");
    Ok(())
}
