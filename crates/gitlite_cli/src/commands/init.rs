//! Initialize a new repository.

use anyhow::Result;
use gitlite_core::Repository;

/// Initialize a repository in the current directory.
///
/// Prints nothing on success.
pub fn run() -> Result<()> {
    Repository::init(".")?;
    Ok(())
}
