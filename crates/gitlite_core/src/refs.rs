//! Branch/HEAD registry.

use crate::error::{GitliteError, Result};
use crate::ObjectId;
use std::collections::BTreeMap;

/// Branch name -> commit id, plus the checked-out branch.
///
/// HEAD is always the current branch's commit. Working-tree effects of
/// moving HEAD belong to the repository controller; this type only keeps the
/// pointers consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRegistry {
    branches: BTreeMap<String, ObjectId>,
    current: String,
}

impl BranchRegistry {
    /// Creates a registry with a single branch checked out at `head`.
    pub fn new(branch: &str, head: ObjectId) -> Self {
        let mut branches = BTreeMap::new();
        branches.insert(branch.to_string(), head);
        Self {
            branches,
            current: branch.to_string(),
        }
    }

    /// Rebuilds a registry from loaded records.
    ///
    /// Returns a description of the inconsistency if the current branch is
    /// unknown or disagrees with HEAD; the caller wraps it with the record path.
    pub fn from_records(
        branches: BTreeMap<String, ObjectId>,
        current: String,
        head: ObjectId,
    ) -> std::result::Result<Self, String> {
        match branches.get(&current) {
            None => Err(format!("current branch {:?} is not in the branch map", current)),
            Some(id) if *id != head => Err(format!(
                "HEAD {} disagrees with branch {:?} at {}",
                head.short(),
                current,
                id.short()
            )),
            Some(_) => Ok(Self { branches, current }),
        }
    }

    /// Name of the checked-out branch.
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Commit the current branch points to.
    pub fn head(&self) -> ObjectId {
        // Every constructor and mutator keeps `current` in the map.
        self.branches[&self.current]
    }

    /// All branches, sorted by name.
    pub fn branches(&self) -> &BTreeMap<String, ObjectId> {
        &self.branches
    }

    /// Looks up a branch.
    pub fn get(&self, name: &str) -> Result<ObjectId> {
        self.branches
            .get(name)
            .copied()
            .ok_or_else(|| GitliteError::BranchNotFound(name.to_string()))
    }

    /// Creates `name` pointing at HEAD.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank or malformed name, `BranchExists` if taken.
    pub fn create_branch(&mut self, name: &str) -> Result<ObjectId> {
        validate_branch_name(name)?;
        if self.branches.contains_key(name) {
            return Err(GitliteError::BranchExists(name.to_string()));
        }
        let head = self.head();
        self.branches.insert(name.to_string(), head);
        Ok(head)
    }

    /// Deletes `name`. The commits it pointed to are kept.
    ///
    /// # Errors
    ///
    /// `BranchNotFound` if absent, `CannotRemoveCurrentBranch` if checked out.
    pub fn delete_branch(&mut self, name: &str) -> Result<ObjectId> {
        let id = self.get(name)?;
        if name == self.current {
            return Err(GitliteError::CannotRemoveCurrentBranch(name.to_string()));
        }
        self.branches.remove(name);
        Ok(id)
    }

    /// Makes `name` the current branch, moving HEAD to its commit.
    ///
    /// # Errors
    ///
    /// `BranchNotFound` if absent, `AlreadyOnBranch` if already current.
    pub fn check_out(&mut self, name: &str) -> Result<ObjectId> {
        let target = self.get(name)?;
        if name == self.current {
            return Err(GitliteError::AlreadyOnBranch(name.to_string()));
        }
        self.current = name.to_string();
        Ok(target)
    }

    /// Moves the current branch (and HEAD) to `commit`.
    pub fn advance(&mut self, commit: ObjectId) {
        self.branches.insert(self.current.clone(), commit);
    }
}

/// Checks a branch name is usable as a record file name.
pub fn validate_branch_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(GitliteError::Validation("Invalid branch name.".to_string()));
    }
    let bad_char = name
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_whitespace() || c.is_control());
    if bad_char || name.starts_with('.') || name.ends_with(".tmp") {
        return Err(GitliteError::Validation(format!(
            "Invalid branch name: {}",
            name
        )));
    }
    Ok(())
}
