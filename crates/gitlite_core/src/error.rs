//! Error types for gitlite_core operations.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for gitlite_core operations.
///
/// Variants fall into two tiers. User errors describe a request that cannot
/// be honored (missing file, blank message, unknown branch, ...); the command
/// performs no effect and the message is shown as-is. Everything else is a
/// fault: persisted state is missing or corrupt, or the filesystem failed.
/// See [`GitliteError::is_user_error`].
#[derive(Error, Debug)]
pub enum GitliteError {
    /// No `.gitlite` directory at the given root.
    #[error("Not in an initialized Gitlite directory.")]
    NotARepository(PathBuf),

    /// `init` was run where a repository already exists.
    #[error("A Gitlite version-control system already exists in the current directory.")]
    AlreadyInitialized,

    /// The working-tree file does not exist.
    #[error("File does not exist.")]
    FileNotFound(String),

    /// The path is absolute, escapes the working tree, or points into the
    /// repository directory.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Commit message was blank.
    #[error("Please enter a commit message.")]
    EmptyMessage,

    /// Both staged sets were empty at commit time.
    #[error("No changes added to the commit.")]
    NothingToCommit,

    /// `rm` on a path that is neither staged nor tracked.
    #[error("No reason to remove the file.")]
    NoReasonToRemove,

    /// Malformed user input (blank branch name, blank message, ...).
    #[error("{0}")]
    Validation(String),

    /// Branch name already taken.
    #[error("A branch with that name already exists.")]
    BranchExists(String),

    /// Branch name unknown.
    #[error("No such branch exists.")]
    BranchNotFound(String),

    /// Attempt to delete the checked-out branch.
    #[error("Cannot remove the current branch.")]
    CannotRemoveCurrentBranch(String),

    /// `switch` to the branch that is already current.
    #[error("No need to switch to the current branch.")]
    AlreadyOnBranch(String),

    /// A file untracked by HEAD would be clobbered by `switch` or `reset`.
    #[error("There is an untracked file in the way; delete it, or add and commit it first.")]
    UntrackedFileInTheWay {
        /// Offending paths, sorted.
        paths: Vec<String>,
    },

    /// No commit matches the given id or prefix.
    #[error("No commit with that id exists.")]
    CommitNotFound(String),

    /// A short id matched more than one commit.
    #[error("Commit id {prefix} is ambiguous ({matches} commits match).")]
    AmbiguousCommitId {
        /// The prefix as given
        prefix: String,
        /// Number of matching commits
        matches: usize,
    },

    /// The file is not tracked by the commit being restored from.
    #[error("File does not exist in that commit.")]
    FileNotInCommit(String),

    /// `find` matched nothing.
    #[error("Found no commit with that message.")]
    NoCommitWithMessage(String),

    /// Blob exceeds maximum allowed size.
    #[error("blob too large: {size} bytes exceeds limit of {limit} bytes")]
    BlobTooLarge {
        /// Actual size of the blob
        size: usize,
        /// Maximum allowed size
        limit: usize,
    },

    /// Repository is locked by another process.
    #[error("repository locked by another process")]
    RepositoryLocked,

    /// Lock is held by a live process.
    #[error("repository lock held by another process (PID: {pid})")]
    LockHeld {
        /// Process ID holding the lock
        pid: u32,
    },

    /// A blob referenced by the history is missing or does not match its id.
    #[error("corrupted object {id}: {reason}")]
    CorruptedObject {
        /// Hex id of the object
        id: String,
        /// Description of the corruption
        reason: String,
    },

    /// A persisted record exists but cannot be trusted.
    #[error("corrupted record at {}: {}", path.display(), reason)]
    CorruptedRecord {
        /// Path to the record
        path: PathBuf,
        /// Description of the corruption
        reason: String,
    },

    /// A record every initialized repository has is missing.
    #[error("missing record: {}", .0.display())]
    MissingRecord(PathBuf),

    /// Invalid hex string for ObjectId parsing.
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    /// Serialization error while writing a record or object.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error while reading a record or object.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Configuration error (loading, parsing, invalid values).
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GitliteError {
    /// Returns true for expected outcomes of a bad request, false for faults.
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self,
            Self::CorruptedObject { .. }
                | Self::CorruptedRecord { .. }
                | Self::MissingRecord(_)
                | Self::InvalidHex(_)
                | Self::Serialization(_)
                | Self::Deserialization(_)
                | Self::ConfigError(_)
                | Self::Io(_)
        )
    }

    /// Returns a user-friendly recovery suggestion for the error, if available.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::CorruptedObject { .. } | Self::CorruptedRecord { .. } | Self::MissingRecord(_) => {
                Some("The repository state under .gitlite/ is damaged; restore it from a backup.")
            }
            Self::ConfigError(_) => {
                Some("Fix or delete .gitlite/config.toml; defaults apply when it is absent.")
            }
            Self::RepositoryLocked | Self::LockHeld { .. } => {
                Some("Wait for the other process to finish, or manually remove .gitlite/LOCK if the process is dead.")
            }
            Self::NotARepository(_) => Some("Run 'gitlite init' first."),
            _ => None,
        }
    }
}

/// Convenience Result type for gitlite_core operations.
pub type Result<T> = std::result::Result<T, GitliteError>;
