//! Branch management: create, delete, switch.

use anyhow::Result;

pub fn create(name: &str) -> Result<()> {
    super::open_repo()?.branch(name)?;
    Ok(())
}

pub fn remove(name: &str) -> Result<()> {
    super::open_repo()?.rm_branch(name)?;
    Ok(())
}

pub fn switch(name: &str) -> Result<()> {
    super::open_repo()?.switch(name)?;
    Ok(())
}
