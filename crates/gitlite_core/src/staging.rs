//! Staging area: pending additions and removals relative to HEAD.

use crate::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Pending changes for the next commit.
///
/// A path is never in both `to_add` and `to_remove`; every mutator below
/// keeps that invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingArea {
    to_add: BTreeMap<String, ObjectId>,
    to_remove: BTreeSet<String>,
}

/// Which reconciliation rule `add` applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A staged file was edited back to its committed content and unstaged.
    Reverted,
    /// A staged file changed again; the staged blob was replaced.
    Restaged,
    /// The file matches HEAD; only a pending removal (if any) was dropped.
    Unchanged,
    /// The file differs from HEAD (or is new) and is now staged.
    Staged,
}

impl StagingArea {
    /// Creates an empty staging area.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages `path` for addition with `blob`, dropping any pending removal.
    pub fn stage_add(&mut self, path: &str, blob: ObjectId) {
        self.to_remove.remove(path);
        self.to_add.insert(path.to_string(), blob);
    }

    /// Stages `path` for removal, dropping any pending addition.
    pub fn stage_remove(&mut self, path: &str) {
        self.to_add.remove(path);
        self.to_remove.insert(path.to_string());
    }

    /// Drops a pending addition. No-op if absent.
    pub fn unstage_add(&mut self, path: &str) {
        self.to_add.remove(path);
    }

    /// Drops a pending removal. No-op if absent.
    pub fn unstage_remove(&mut self, path: &str) {
        self.to_remove.remove(path);
    }

    /// Empties both sets.
    pub fn clear(&mut self) {
        self.to_add.clear();
        self.to_remove.clear();
    }

    /// Returns true if nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Paths staged for addition and their blobs, sorted by path.
    pub fn staged_for_addition(&self) -> &BTreeMap<String, ObjectId> {
        &self.to_add
    }

    /// Paths staged for removal, sorted.
    pub fn staged_for_removal(&self) -> &BTreeSet<String> {
        &self.to_remove
    }

    /// Returns true if `path` is staged for addition.
    pub fn is_staged_for_addition(&self, path: &str) -> bool {
        self.to_add.contains_key(path)
    }

    /// Returns true if `path` is staged for removal.
    pub fn is_staged_for_removal(&self, path: &str) -> bool {
        self.to_remove.contains(path)
    }

    /// Checks that no path is staged both ways, as after loading a record.
    ///
    /// Returns a description of the first overlap; the caller wraps it with
    /// the record path.
    pub fn check_disjoint(&self) -> std::result::Result<(), String> {
        match self.to_add.keys().find(|path| self.to_remove.contains(*path)) {
            Some(path) => Err(format!(
                "{:?} is staged for both addition and removal",
                path
            )),
            None => Ok(()),
        }
    }

    /// Applies the `add` policy for `path` now hashing to `new_blob`, where
    /// `committed` is HEAD's blob for the path (if tracked).
    ///
    /// Afterwards the staging area holds the minimal diff between the working
    /// file and HEAD for this path.
    pub fn reconcile_add(
        &mut self,
        path: &str,
        new_blob: ObjectId,
        committed: Option<ObjectId>,
    ) -> AddOutcome {
        let matches_head = committed == Some(new_blob);

        if self.is_staged_for_addition(path) {
            if matches_head {
                self.unstage_add(path);
                self.unstage_remove(path);
                AddOutcome::Reverted
            } else {
                self.stage_add(path, new_blob);
                AddOutcome::Restaged
            }
        } else if matches_head {
            self.unstage_remove(path);
            AddOutcome::Unchanged
        } else {
            self.stage_add(path, new_blob);
            AddOutcome::Staged
        }
    }
}
