//! Status report: branches, staged changes and working-tree drift.

use crate::error::Result;
use crate::state::RepoState;
use crate::worktree::WorkingTree;
use crate::ObjectId;
use std::collections::BTreeSet;

/// How a working-tree file differs from what the next commit would record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modification {
    /// Content changed since it was tracked or staged.
    Modified,
    /// Tracked or staged, but gone from the working tree.
    Deleted,
}

impl Modification {
    /// Label used in `status` output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        }
    }
}

/// Everything `status` prints. Every list is sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    /// All branch names.
    pub branches: Vec<String>,
    /// The checked-out branch.
    pub current_branch: String,
    /// Paths staged for addition.
    pub staged: Vec<String>,
    /// Paths staged for removal.
    pub removed: Vec<String>,
    /// Unstaged modifications.
    pub modifications: Vec<(String, Modification)>,
    /// Files neither staged for addition nor tracked by HEAD.
    pub untracked: Vec<String>,
}

impl StatusReport {
    /// Compares staging, HEAD and the working tree. Reads files, writes nothing.
    pub fn compute(state: &RepoState, worktree: &WorkingTree) -> Result<Self> {
        let head = state.head_commit()?;
        let staging = &state.staging;
        let files = worktree.list_files()?;

        let mut candidates: BTreeSet<&str> = files.iter().map(String::as_str).collect();
        candidates.extend(head.tree().keys().map(String::as_str));
        candidates.extend(staging.staged_for_addition().keys().map(String::as_str));

        let mut modifications = Vec::new();
        let mut untracked = Vec::new();

        for path in candidates {
            let on_disk = if files.contains(path) {
                Some(ObjectId::hash_blob(&worktree.read(path)?))
            } else {
                None
            };
            let staged = staging.staged_for_addition().get(path).copied();
            let removed = staging.is_staged_for_removal(path);
            let tracked = head.blob_for(path);

            match (on_disk, staged, tracked) {
                (Some(current), Some(blob), _) if current != blob => {
                    modifications.push((path.to_string(), Modification::Modified));
                }
                (Some(current), None, Some(blob)) if current != blob && !removed => {
                    modifications.push((path.to_string(), Modification::Modified));
                }
                (None, Some(_), _) => {
                    modifications.push((path.to_string(), Modification::Deleted));
                }
                (None, None, Some(_)) if !removed => {
                    modifications.push((path.to_string(), Modification::Deleted));
                }
                (Some(_), None, None) => untracked.push(path.to_string()),
                // Staged for removal but recreated.
                (Some(_), None, Some(_)) if removed => untracked.push(path.to_string()),
                _ => {}
            }
        }

        Ok(Self {
            branches: state.branches.branches().keys().cloned().collect(),
            current_branch: state.branches.current().to_string(),
            staged: staging.staged_for_addition().keys().cloned().collect(),
            removed: staging.staged_for_removal().iter().cloned().collect(),
            modifications,
            untracked,
        })
    }
}
