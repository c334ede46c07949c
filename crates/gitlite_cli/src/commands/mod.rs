//! CLI commands.

pub mod add;
pub mod branch;
pub mod commit;
pub mod init;
pub mod log;
pub mod reset;
pub mod restore;
pub mod rm;
pub mod status;

use anyhow::{Context, Result};
use gitlite_core::Repository;

/// Opens the repository in the current directory.
pub(crate) fn open_repo() -> Result<Repository> {
    Repository::open(".").context("failed to open repository")
}
