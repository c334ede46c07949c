//! The immutable commit set and ancestry walking.

use crate::error::{GitliteError, Result};
use crate::types::{Commit, Tree};
use crate::ObjectId;
use std::collections::BTreeMap;

/// Every commit ever made, keyed by id.
///
/// Commits are only ever inserted. The whole set is one persisted record,
/// loaded at command start and rewritten at command end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitGraph {
    commits: BTreeMap<ObjectId, Commit>,
}

impl CommitGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a graph from loaded commits, re-hashing each one.
    ///
    /// # Errors
    ///
    /// Returns `CorruptedObject` if a commit no longer hashes to its id or is
    /// filed under the wrong key.
    pub fn from_records(records: BTreeMap<ObjectId, Commit>) -> Result<Self> {
        for (key, commit) in &records {
            commit.verify()?;
            if *key != commit.id() {
                return Err(GitliteError::CorruptedObject {
                    id: key.as_hex(),
                    reason: format!("commit filed under {} has id {}", key, commit.id()),
                });
            }
        }
        Ok(Self { commits: records })
    }

    /// Borrow the underlying map for persistence.
    pub fn records(&self) -> &BTreeMap<ObjectId, Commit> {
        &self.commits
    }

    /// Creates and inserts a commit.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `message` is blank.
    pub fn create_commit(
        &mut self,
        message: &str,
        parent: Option<ObjectId>,
        tree: Tree,
        timestamp_unix: i64,
    ) -> Result<&Commit> {
        let commit = Commit::new(message, parent, timestamp_unix, tree)?;
        Ok(self.insert(commit))
    }

    /// Inserts a commit. Re-inserting an existing id keeps the original.
    pub fn insert(&mut self, commit: Commit) -> &Commit {
        self.commits.entry(commit.id()).or_insert(commit)
    }

    /// Looks up a commit by exact id.
    pub fn get(&self, id: ObjectId) -> Result<&Commit> {
        self.commits
            .get(&id)
            .ok_or_else(|| GitliteError::CommitNotFound(id.as_hex()))
    }

    /// Returns true if the commit exists.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.commits.contains_key(&id)
    }

    /// Number of commits.
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    /// Returns true if there are no commits.
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// Walks first-parent links from `start` back to the root.
    ///
    /// Lazy; every call starts over from `start`.
    pub fn ancestors(&self, start: ObjectId) -> Ancestors<'_> {
        Ancestors {
            graph: self,
            next: Some(start),
        }
    }

    /// All commits, in no particular order.
    pub fn all_commits(&self) -> impl Iterator<Item = &Commit> {
        self.commits.values()
    }

    /// Ids of commits whose message equals `message` exactly.
    pub fn find_by_message(&self, message: &str) -> Vec<ObjectId> {
        self.commits
            .values()
            .filter(|c| c.message() == message)
            .map(Commit::id)
            .collect()
    }

    /// Resolves a full id or an unambiguous hex prefix.
    ///
    /// # Errors
    ///
    /// Returns `CommitNotFound` when nothing matches and `AmbiguousCommitId`
    /// when a prefix matches more than one commit.
    pub fn resolve(&self, id_or_prefix: &str) -> Result<ObjectId> {
        let wanted = id_or_prefix.trim();
        if let Ok(id) = ObjectId::from_hex(wanted) {
            return if self.contains(id) {
                Ok(id)
            } else {
                Err(GitliteError::CommitNotFound(wanted.to_string()))
            };
        }

        let matches: Vec<ObjectId> = self
            .commits
            .keys()
            .filter(|id| id.matches_prefix(wanted))
            .copied()
            .collect();

        match matches.as_slice() {
            [] => Err(GitliteError::CommitNotFound(wanted.to_string())),
            [only] => Ok(*only),
            _ => Err(GitliteError::AmbiguousCommitId {
                prefix: wanted.to_string(),
                matches: matches.len(),
            }),
        }
    }
}

/// Iterator over a commit and its first-parent ancestors.
///
/// Yields an error and stops if a parent link points at a missing commit.
pub struct Ancestors<'a> {
    graph: &'a CommitGraph,
    next: Option<ObjectId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = Result<&'a Commit>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        match self.graph.commits.get(&id) {
            Some(commit) => {
                self.next = commit.parent();
                Some(Ok(commit))
            }
            None => Some(Err(GitliteError::CorruptedObject {
                id: id.as_hex(),
                reason: "commit referenced in history is missing".to_string(),
            })),
        }
    }
}
