//! Core data types for gitlite.

use crate::error::{GitliteError, Result};
use crate::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A commit's snapshot: repository-relative path -> blob id.
pub type Tree = BTreeMap<String, ObjectId>;

/// Message of the root commit created by `init`.
pub const INITIAL_COMMIT_MESSAGE: &str = "initial commit";

/// Immutable snapshot of one file's bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    /// Raw file contents.
    pub content: Vec<u8>,
    /// Path that first produced this content. Not part of the id.
    pub source_path: String,
}

impl Blob {
    /// Creates a blob for `content` read from `source_path`.
    pub fn new(content: Vec<u8>, source_path: impl Into<String>) -> Self {
        Self {
            content,
            source_path: source_path.into(),
        }
    }

    /// Content id of this blob.
    pub fn id(&self) -> ObjectId {
        ObjectId::hash_blob(&self.content)
    }
}

/// An immutable commit record.
///
/// The id is derived once in [`Commit::new`] from the complete commit state and
/// fields are only readable afterwards, so a commit can never drift from its
/// id. Records loaded from disk are re-hashed by [`Commit::verify`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    id: ObjectId,
    message: String,
    parent: Option<ObjectId>,
    /// Second parent slot. Nothing sets it: merging is not implemented.
    merge_parent: Option<ObjectId>,
    timestamp_unix: i64,
    tree: Tree,
}

/// Borrowed view of the hashed fields, in a fixed order.
#[derive(Serialize)]
struct CommitContent<'a> {
    message: &'a str,
    parent: &'a Option<ObjectId>,
    merge_parent: &'a Option<ObjectId>,
    timestamp_unix: i64,
    tree: &'a Tree,
}

impl Commit {
    /// Builds a commit and derives its id from the final state.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the message is blank.
    pub fn new(
        message: &str,
        parent: Option<ObjectId>,
        timestamp_unix: i64,
        tree: Tree,
    ) -> Result<Self> {
        if message.trim().is_empty() {
            return Err(GitliteError::Validation(
                "commit message must not be blank".to_string(),
            ));
        }

        let id = Self::compute_id(message, &parent, &None, timestamp_unix, &tree)?;
        Ok(Self {
            id,
            message: message.to_string(),
            parent,
            merge_parent: None,
            timestamp_unix,
            tree,
        })
    }

    /// The root commit every repository starts from: fixed message, no
    /// parent, epoch timestamp, empty tree. Identical in every repository.
    pub fn root() -> Result<Self> {
        Self::new(INITIAL_COMMIT_MESSAGE, None, 0, Tree::new())
    }

    /// Content id.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Commit message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// First parent, `None` for the root commit.
    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    /// Reserved second parent. Always `None`.
    pub fn merge_parent(&self) -> Option<ObjectId> {
        self.merge_parent
    }

    /// Creation time, Unix seconds (UTC).
    pub fn timestamp_unix(&self) -> i64 {
        self.timestamp_unix
    }

    /// Tracked files.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Blob tracked at `path`, if any.
    pub fn blob_for(&self, path: &str) -> Option<ObjectId> {
        self.tree.get(path).copied()
    }

    /// Returns true if `path` is tracked.
    pub fn tracks(&self, path: &str) -> bool {
        self.tree.contains_key(path)
    }

    /// Recomputes the id from the stored fields and checks it matches.
    pub fn verify(&self) -> Result<()> {
        let actual = Self::compute_id(
            &self.message,
            &self.parent,
            &self.merge_parent,
            self.timestamp_unix,
            &self.tree,
        )?;
        if actual != self.id {
            return Err(GitliteError::CorruptedObject {
                id: self.id.as_hex(),
                reason: format!("commit content hashes to {}", actual.as_hex()),
            });
        }
        Ok(())
    }

    fn compute_id(
        message: &str,
        parent: &Option<ObjectId>,
        merge_parent: &Option<ObjectId>,
        timestamp_unix: i64,
        tree: &Tree,
    ) -> Result<ObjectId> {
        let content = CommitContent {
            message,
            parent,
            merge_parent,
            timestamp_unix,
            tree,
        };
        let serialized = postcard::to_allocvec(&content)
            .map_err(|e| GitliteError::Serialization(e.to_string()))?;
        Ok(ObjectId::hash_commit(&serialized))
    }
}
